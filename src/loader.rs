use crate::error::{BridgeError, Result};
use crate::model::{Model, ModelConfig, ModelRecord, check_record};
use burn::module::Module;
use burn::prelude::Backend;
use burn::record::{FullPrecisionSettings, NamedMpkFileRecorder, Recorder, RecorderError};
use std::path::{Path, PathBuf};
use std::time::Instant;
use tracing::{debug, info, warn};

/// チェックポイントの拡張子。レコーダーは読み込み時にこの拡張子へ置き換えます。
pub const CHECKPOINT_EXTENSION: &str = "mpk";

/// 学習済みモデルをチェックポイントから復元するローダー。
///
/// プロセスの開始時に一度だけ使い、得られた [`Model`] を推論側へ明示的に渡します。
pub struct ModelLoader<B: Backend> {
    config: ModelConfig,
    device: B::Device,
    verbose: bool,
}

impl<B: Backend> ModelLoader<B> {
    pub fn new(config: ModelConfig, device: B::Device) -> Self {
        Self {
            config,
            device,
            verbose: false,
        }
    }

    /// 読み込み完了時に確認メッセージを出すかどうかを設定します。
    pub fn with_verbose(mut self, verbose: bool) -> Self {
        self.verbose = verbose;
        self
    }

    pub fn config(&self) -> &ModelConfig {
        &self.config
    }

    /// チェックポイントを読み込み、推論可能なモデルを返します。
    ///
    /// 失敗した場合はモデルを一切返さず、チェックポイント自体にも触れません。
    pub fn load(&self, path: &Path) -> Result<Model<B>> {
        self.config.validate()?;

        let resolved = resolve_checkpoint_path(path);
        if extension_rewritten(path) {
            warn!(
                requested = %path.display(),
                resolved = %resolved.display(),
                "チェックポイントの拡張子を .{CHECKPOINT_EXTENSION} に置き換えて読み込みます"
            );
        }
        if !resolved.is_file() {
            return Err(BridgeError::ArtifactNotFound(resolved));
        }

        let load_start = Instant::now();
        let record: ModelRecord<B> = NamedMpkFileRecorder::<FullPrecisionSettings>::new()
            .load(resolved.clone(), &self.device)
            .map_err(|e| map_recorder_error(&resolved, e))?;
        check_record(&self.config, &record)?;

        let model = Model::new(&self.config, &self.device).load_record(record);
        let load_duration = load_start.elapsed();

        if self.verbose {
            info!(
                path = %resolved.display(),
                layers = model.num_layers(),
                hidden = self.config.n_hidden,
                elapsed = ?load_duration,
                "保存済みモデルをロードしました"
            );
        } else {
            debug!(
                path = %resolved.display(),
                elapsed = ?load_duration,
                "保存済みモデルをロードしました"
            );
        }
        Ok(model)
    }
}

/// レコーダーが実際に開くパスを返します。
pub fn resolve_checkpoint_path(path: &Path) -> PathBuf {
    path.with_extension(CHECKPOINT_EXTENSION)
}

/// 指定されたパスの拡張子が読み込み時に置き換わるかどうか
pub fn extension_rewritten(path: &Path) -> bool {
    path.extension().is_some_and(|ext| ext != CHECKPOINT_EXTENSION)
}

fn map_recorder_error(path: &Path, error: RecorderError) -> BridgeError {
    match error {
        RecorderError::FileNotFound(_) => BridgeError::ArtifactNotFound(path.to_path_buf()),
        other => BridgeError::ArtifactCorrupt {
            path: path.to_path_buf(),
            reason: other.to_string(),
        },
    }
}
