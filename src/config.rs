use std::ops::RangeInclusive;
use std::path::PathBuf;
use std::time::Duration;

pub const DEFAULT_TARGET_URL: &str =
    "https://asic.gov.au/about-asic/corporate-publications/asic-gazette/asic-gazettes-2011-2020/";
pub const DEFAULT_BASE_URL: &str = "https://asic.gov.au";
pub const DEFAULT_OUTPUT_PATH: &str = "asic_gazettes_2011_2020.csv";

#[derive(Debug, Clone)]
pub struct ScraperConfig {
    pub target_url: String,
    pub output_path: PathBuf,
    /// 相対リンクの解決に使うベースURL
    pub base_url: String,
    pub headless: bool,
    pub debug: bool,
    pub chrome_path: Option<PathBuf>,
    pub page_load_timeout: Duration,
    pub element_wait_timeout: Duration,
    /// 折りたたみ展開後、テーブルが現れるまで待つ上限
    pub expand_timeout: Duration,
    pub poll_interval: Duration,
    pub delay_between_years: Duration,
    /// 見出しテキストから年ラベルを拾うための年トークン
    pub year_tokens: RangeInclusive<u16>,
    /// テキスト全体が年のみの要素を探すときの範囲
    pub year_scan_range: RangeInclusive<u16>,
}

impl Default for ScraperConfig {
    fn default() -> Self {
        Self {
            target_url: DEFAULT_TARGET_URL.to_string(),
            output_path: PathBuf::from(DEFAULT_OUTPUT_PATH),
            base_url: DEFAULT_BASE_URL.to_string(),
            headless: true,
            debug: false,
            chrome_path: None,
            page_load_timeout: Duration::from_secs(30),
            element_wait_timeout: Duration::from_secs(10),
            expand_timeout: Duration::from_secs(5),
            poll_interval: Duration::from_millis(250),
            delay_between_years: Duration::from_secs(1),
            year_tokens: 2011..=2020,
            year_scan_range: 2011..=2025,
        }
    }
}

impl ScraperConfig {
    pub fn new(target_url: impl Into<String>) -> Self {
        Self {
            target_url: target_url.into(),
            ..Default::default()
        }
    }

    /// 環境変数で既定値を上書きする
    pub fn from_env() -> Self {
        let mut config = Self::default();

        if let Ok(url) = std::env::var("GAZETTE_URL") {
            config.target_url = url;
        }
        if let Ok(path) = std::env::var("GAZETTE_OUTPUT") {
            config.output_path = PathBuf::from(path);
        }
        if let Ok(base) = std::env::var("GAZETTE_BASE_URL") {
            config.base_url = base;
        }
        if let Ok(headless) = std::env::var("HEADLESS") {
            config.headless = headless != "false";
        }
        if let Ok(debug) = std::env::var("GAZETTE_DEBUG") {
            config.debug = debug == "true" || debug == "1";
        }
        config.chrome_path = std::env::var("CHROME_PATH")
            .or_else(|_| std::env::var("CHROMIUM_PATH"))
            .ok()
            .map(PathBuf::from);

        config
    }

    pub fn with_output_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.output_path = path.into();
        self
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    pub fn with_headless(mut self, headless: bool) -> Self {
        self.headless = headless;
        self
    }

    pub fn with_debug(mut self, debug: bool) -> Self {
        self.debug = debug;
        self
    }

    pub fn with_page_load_timeout(mut self, timeout: Duration) -> Self {
        self.page_load_timeout = timeout;
        self
    }

    pub fn with_element_wait_timeout(mut self, timeout: Duration) -> Self {
        self.element_wait_timeout = timeout;
        self
    }

    pub fn with_expand_timeout(mut self, timeout: Duration) -> Self {
        self.expand_timeout = timeout;
        self
    }

    pub fn with_poll_interval(mut self, interval: Duration) -> Self {
        self.poll_interval = interval;
        self
    }

    pub fn with_delay_between_years(mut self, delay: Duration) -> Self {
        self.delay_between_years = delay;
        self
    }

    pub fn with_year_tokens(mut self, years: RangeInclusive<u16>) -> Self {
        self.year_tokens = years;
        self
    }

    pub fn with_year_scan_range(mut self, years: RangeInclusive<u16>) -> Self {
        self.year_scan_range = years;
        self
    }

    /// 新しい年から順に並べた年トークン
    pub fn year_token_strings(&self) -> Vec<String> {
        self.year_tokens.clone().rev().map(|y| y.to_string()).collect()
    }
}
