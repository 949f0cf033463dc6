use crate::InferenceBackend;
use crate::cli::Cli;
use crate::error::{BridgeError, Result};
use crate::loader::ModelLoader;
use crate::model::{INPUT_DIM, Model};
use crate::output::write_prediction;
use burn::module::Module;
use burn::prelude::Backend;
use burn::tensor::Tensor;
use std::any::Any;
use std::panic::{self, AssertUnwindSafe};
use std::time::Instant;
use tracing::{debug, info};

/// スカラーを1つ受け取りスカラーを1つ返す、評価可能なモデル。
///
/// 推論の呼び出し側はこのトレイトだけに依存し、数値計算ランタイムを意識しません。
pub trait Evaluate {
    fn evaluate(&self, x: f32) -> Result<f32>;
}

impl<B: Backend> Evaluate for Model<B> {
    /// `x` を形状 `[1, 1]` のテンソルにして順伝播を1回だけ実行します。
    fn evaluate(&self, x: f32) -> Result<f32> {
        let device = self.devices().into_iter().next().unwrap_or_default();
        let input = Tensor::<B, 2>::from_floats([[x; INPUT_DIM]], &device);

        let output = panic::catch_unwind(AssertUnwindSafe(|| self.forward(input)))
            .map_err(|payload| BridgeError::Evaluation(panic_message(&*payload)))?;

        let values = output
            .into_data()
            .convert::<f32>()
            .into_vec::<f32>()
            .map_err(|e| BridgeError::Evaluation(format!("{e:?}")))?;
        match values.as_slice() {
            [y] => Ok(*y),
            other => Err(BridgeError::Evaluation(format!(
                "出力は1要素のはずですが {} 要素でした",
                other.len()
            ))),
        }
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "数値計算ランタイムがパニックしました".to_string()
    }
}

/// モデルで `x` に対する予測値を1つ計算します。
///
/// 入力範囲の検証は行いません。学習範囲外の値も外挿した結果を返します。
pub fn predict<M: Evaluate + ?Sized>(model: &M, x: f32) -> Result<f32> {
    let y = model.evaluate(x)?;
    debug!(input = x, prediction = y, "推論が完了しました");
    Ok(y)
}

/// 文字列の入力値を数値に変換します。
///
/// 数値として解釈できない文字列と、有限でない値（`nan`、`inf`、`f32` の範囲外）は拒否します。
pub fn parse_input(raw: &str) -> Result<f32> {
    let trimmed = raw.trim();
    let value = trimmed
        .parse::<f32>()
        .map_err(|e| BridgeError::InvalidInput {
            input: raw.to_string(),
            reason: e.to_string(),
        })?;
    if !value.is_finite() {
        return Err(BridgeError::InvalidInput {
            input: raw.to_string(),
            reason: "有限の値ではありません".to_string(),
        });
    }
    Ok(value)
}

/// ロード済みのモデルを保持し、予測を提供するハンドル。
///
/// モデルはプロセスごとに一度だけ構築し、このハンドルで明示的に受け渡します。
pub struct Predictor<M> {
    model: M,
}

impl<M: Evaluate> Predictor<M> {
    pub fn new(model: M) -> Self {
        Self { model }
    }

    /// [`warm_up`](Self::warm_up) を済ませたハンドルを作ります。
    ///
    /// ロード直後に一度評価しておきたい組み込み側向けです。プロセスモードは1回しか推論しないため使いません。
    pub fn warmed(model: M) -> Result<Self> {
        let predictor = Self::new(model);
        predictor.warm_up()?;
        Ok(predictor)
    }

    pub fn predict(&self, x: f32) -> Result<f32> {
        predict(&self.model, x)
    }

    /// 文字列の入力値を解析してから予測します。解析に失敗した場合は順伝播を行いません。
    pub fn predict_str(&self, raw: &str) -> Result<f32> {
        let x = parse_input(raw)?;
        self.predict(x)
    }

    /// ダミー入力 `0.0` で一度だけ評価し、結果は捨てます。
    ///
    /// 呼ぶかどうかは組み込み側が決めます。[`Predictor::warmed`] はロード直後にこれを呼びます。
    pub fn warm_up(&self) -> Result<()> {
        self.model.evaluate(0.0).map(|_| ())
    }

    pub fn model(&self) -> &M {
        &self.model
    }

    pub fn into_inner(self) -> M {
        self.model
    }
}

/// プロセスモードを実行します。
///
/// 入力値の解析、モデルのロード、推論、出力ファイルへの書き込みをこの順に行い、予測値を返します。
/// 入力値が不正な場合はモデルにも出力ファイルにも触れずに失敗します。
pub fn run(cli: &Cli) -> Result<f32> {
    let x = parse_input(&cli.input)?;

    let device = Default::default();
    let model = ModelLoader::<InferenceBackend>::new(cli.model_config(), device)
        .with_verbose(cli.verbose)
        .load(&cli.model)?;
    let predictor = Predictor::new(model);

    let inference_start = Instant::now();
    let prediction = predictor.predict(x)?;
    let inference_duration = inference_start.elapsed();

    let output_path = cli.output_path();
    write_prediction(&output_path, prediction, cli.write_mode)?;
    info!(
        input = x,
        prediction,
        output = %output_path.display(),
        elapsed = ?inference_duration,
        "予測値を書き出しました"
    );
    Ok(prediction)
}
