//! 結合テストで共有するヘルパー

use std::path::{Path, PathBuf};

use burn::module::Module;
use burn::record::{FullPrecisionSettings, NamedMpkFileRecorder};
use pinn_bridge::InferenceBackend;
use pinn_bridge::model::ModelConfig;

/// 初期化したばかりのモデルを `dir/name` に保存し、チェックポイントのパスを返します。
pub fn save_checkpoint(dir: &Path, name: &str, config: &ModelConfig) -> PathBuf {
    let device = Default::default();
    let path = dir.join(name);
    config
        .init::<InferenceBackend>(&device)
        .save_file(
            path.clone(),
            &NamedMpkFileRecorder::<FullPrecisionSettings>::new(),
        )
        .expect("チェックポイントを保存できません");
    path
}
