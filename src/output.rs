//! データセットのCSV出力

use std::io::Write;
use std::path::Path;

use tracing::info;

use crate::error::ScraperError;
use crate::gazette::Dataset;

/// ヘッダ行に続けて全行を書き出す
pub fn write_csv<W: Write>(dataset: &Dataset, writer: W) -> Result<(), ScraperError> {
    let mut wtr = csv::Writer::from_writer(writer);
    wtr.write_record(&dataset.headers)?;
    for row in &dataset.rows {
        wtr.write_record(row)?;
    }
    wtr.flush()?;
    Ok(())
}

/// ファイルに保存する。空のデータセットは書き出さず `false` を返す
pub fn save_csv(dataset: &Dataset, path: &Path) -> Result<bool, ScraperError> {
    if dataset.is_empty() {
        info!("保存するデータがありません");
        return Ok(false);
    }

    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)?;
    }
    let file = std::fs::File::create(path)?;
    write_csv(dataset, file)?;

    info!("データを保存: {}", path.display());
    info!(
        "CSV出力: {}列, {}行",
        dataset.headers.len(),
        dataset.len()
    );
    Ok(true)
}
