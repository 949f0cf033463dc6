use std::path::PathBuf;

use thiserror::Error;

/// ブリッジ全体で使うエラー型。
///
/// どのエラーもその場では回復せず、呼び出し元（またはプロセスの終了コード）まで伝播します。
#[derive(Error, Debug)]
pub enum BridgeError {
    #[error("モデルファイル '{}' が見つかりません。", .0.display())]
    ArtifactNotFound(PathBuf),

    #[error("モデルファイル '{}' を読み込めません: {reason}", .path.display())]
    ArtifactCorrupt { path: PathBuf, reason: String },

    #[error("モデルの構造が一致しません: {0}")]
    ArchitectureMismatch(String),

    #[error("入力値 '{input}' を数値として解釈できません: {reason}")]
    InvalidInput { input: String, reason: String },

    #[error("順伝播に失敗しました: {0}")]
    Evaluation(String),

    #[error("出力ファイル '{}' に書き込めません: {source}", .path.display())]
    Output {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl BridgeError {
    /// プロセスモードで使う終了コードを返します。
    pub fn exit_code(&self) -> u8 {
        match self {
            BridgeError::InvalidInput { .. } => 2,
            BridgeError::ArtifactNotFound(_)
            | BridgeError::ArtifactCorrupt { .. }
            | BridgeError::ArchitectureMismatch(_) => 3,
            BridgeError::Evaluation(_) => 4,
            BridgeError::Output { .. } => 5,
        }
    }
}

pub type Result<T> = std::result::Result<T, BridgeError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn exit_codes_separate_failure_classes() {
        let invalid = BridgeError::InvalidInput {
            input: "abc".to_string(),
            reason: "invalid float literal".to_string(),
        };
        let missing = BridgeError::ArtifactNotFound(PathBuf::from("missing.mpk"));
        let mismatch = BridgeError::ArchitectureMismatch("layer 0".to_string());
        let eval = BridgeError::Evaluation("shape".to_string());
        let output = BridgeError::Output {
            path: PathBuf::from("out.txt"),
            source: std::io::Error::other("disk full"),
        };

        assert_eq!(invalid.exit_code(), 2);
        assert_eq!(missing.exit_code(), 3);
        assert_eq!(mismatch.exit_code(), 3);
        assert_eq!(eval.exit_code(), 4);
        assert_eq!(output.exit_code(), 5);
    }

    #[test]
    fn messages_name_the_offending_path() {
        let err = BridgeError::ArtifactNotFound(PathBuf::from("PINN/model.mpk"));
        assert!(err.to_string().contains("PINN/model.mpk"));
    }
}
