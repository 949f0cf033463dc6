//! 予測値をファイル経由で呼び出し元プロセスへ渡します。
//!
//! 書き手は1プロセス、読み手は1プロセスを想定しています。書き込みのたびに前回の値を上書きし、
//! 履歴は残しません。[`WriteMode::Overwrite`] では書き込み途中のファイルが見える可能性があるため、
//! 同じパスを並行して読み書きする場合は [`WriteMode::Atomic`] を使うか、呼び出しごとに別のパスを指定します。

use crate::OUTPUT_FILENAME;
use crate::error::BridgeError;
use clap::ValueEnum;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;
use tracing::debug;

/// 出力ファイルへの書き込み方法
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, ValueEnum)]
pub enum WriteMode {
    /// 既存のファイルを切り詰めてから書き込みます（非アトミック）
    #[default]
    Overwrite,
    /// 同じディレクトリの一時ファイルに書き込み、名前の変更で置き換えます
    Atomic,
}

/// 既定の出力先（一時ディレクトリ直下の共有パス）
pub fn default_output_path() -> PathBuf {
    std::env::temp_dir().join(OUTPUT_FILENAME)
}

/// 予測値をファイルに書き出す文字列へ変換します。
///
/// `f32` を往復可能な最短の10進表記にし、改行は付けません。
pub fn format_prediction(prediction: f32) -> String {
    prediction.to_string()
}

/// 予測値を `path` に書き込みます。
///
/// ファイルハンドルはどの経路でも関数を抜ける時点で閉じられます。
pub fn write_prediction(
    path: &Path,
    prediction: f32,
    mode: WriteMode,
) -> crate::error::Result<()> {
    let text = format_prediction(prediction);
    let written = match mode {
        WriteMode::Overwrite => write_in_place(path, &text),
        WriteMode::Atomic => write_atomic(path, &text),
    };
    written.map_err(|source| BridgeError::Output {
        path: path.to_path_buf(),
        source,
    })?;
    debug!(path = %path.display(), value = %text, ?mode, "予測値を書き込みました");
    Ok(())
}

fn write_in_place(path: &Path, text: &str) -> std::io::Result<()> {
    let mut writer = BufWriter::new(File::create(path)?);
    writer.write_all(text.as_bytes())?;
    writer.flush()
}

fn write_atomic(path: &Path, text: &str) -> std::io::Result<()> {
    let dir = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };
    let mut tmp = NamedTempFile::new_in(dir)?;
    tmp.write_all(text.as_bytes())?;
    tmp.as_file().sync_all()?;
    tmp.persist(path).map_err(|e| e.error)?;
    Ok(())
}
