//! # PINN 推論ブリッジ
//!
//! `burn` で学習済みの物理情報ニューラルネットワーク（PINN）をチェックポイントから
//! 復元し、スカラー入力1つに対して1回だけ順伝播を実行するための小さなライブラリです。
//!
//! - ライブラリモード: [`inference::Predictor`] を介して呼び出し元に値を直接返します。
//! - プロセスモード: [`inference::run`] が引数を解析し、予測値をファイルに書き出します。

pub mod cli;
pub mod error;
pub mod inference;
pub mod loader;
pub mod model;
pub mod output;

pub use error::{BridgeError, Result};

/// 学習済みモデルのファイル名
pub const MODEL_FILENAME: &str = "pinn_model.mpk";

/// 予測値を書き出すファイル名（一時ディレクトリ直下）
pub const OUTPUT_FILENAME: &str = "pinn_output.txt";

/// 推論に使うバックエンド
pub type InferenceBackend = burn::backend::NdArray<f32>;
