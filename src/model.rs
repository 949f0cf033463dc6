use crate::error::BridgeError;
use burn::config::Config;
use burn::module::Module;
use burn::nn::{Linear, LinearConfig, Tanh};
use burn::prelude::Backend;
use burn::tensor::Tensor;

/// モデルの入力次元（スカラー1つ）
pub const INPUT_DIM: usize = 1;

/// モデルの出力次元（スカラー1つ）
pub const OUTPUT_DIM: usize = 1;

/// 学習時に決められたネットワーク構造。
///
/// チェックポイントにはパラメータしか含まれないため、読み込む側が同じ構造を知っている必要があります。
#[derive(Config, Debug)]
pub struct ModelConfig {
    /// 隠れ層のユニット数
    #[config(default = 20)]
    pub n_hidden: usize,
    /// 線形層の総数（入力層と出力層を含む）
    #[config(default = 4)]
    pub n_layers: usize,
}

impl ModelConfig {
    /// 構造として成り立つ設定かを確認します。
    pub fn validate(&self) -> crate::error::Result<()> {
        if self.n_layers < 2 {
            return Err(BridgeError::ArchitectureMismatch(format!(
                "線形層は2層以上必要です (n_layers = {})",
                self.n_layers
            )));
        }
        if self.n_hidden == 0 {
            return Err(BridgeError::ArchitectureMismatch(
                "隠れ層のユニット数が0です".to_string(),
            ));
        }
        Ok(())
    }

    /// 各線形層の重みの形状 `[d_input, d_output]` を入力側から順に返します。
    pub fn layer_shapes(&self) -> Vec<[usize; 2]> {
        let mut shapes = Vec::with_capacity(self.n_layers);
        shapes.push([INPUT_DIM, self.n_hidden]);
        for _ in 1..self.n_layers.saturating_sub(1) {
            shapes.push([self.n_hidden, self.n_hidden]);
        }
        shapes.push([self.n_hidden, OUTPUT_DIM]);
        shapes
    }

    /// 設定どおりの構造でモデルを初期化します。
    pub fn init<B: Backend>(&self, device: &B::Device) -> Model<B> {
        Model::new(self, device)
    }
}

/// PINNの本体となるニューラルネットワークモデル。
///
/// スカラー値を1つ受け取り、スカラー値を1つ予測する多層パーセプトロン（MLP）です。
#[derive(Module, Debug)]
pub struct Model<B: Backend> {
    linears: Vec<Linear<B>>,
    activation: Tanh,
}

impl<B: Backend> Model<B> {
    /// 新しいモデルを初期化します。
    pub fn new(config: &ModelConfig, device: &B::Device) -> Self {
        let linears = config
            .layer_shapes()
            .into_iter()
            .map(|[d_input, d_output]| LinearConfig::new(d_input, d_output).init(device))
            .collect();
        Self {
            linears,
            activation: Tanh::new(),
        }
    }

    /// モデルの順伝播を実行します。
    pub fn forward(&self, input: Tensor<B, 2>) -> Tensor<B, 2> {
        let n_linears = self.linears.len();
        let mut x = input;
        for (i, linear) in self.linears.iter().enumerate() {
            x = linear.forward(x);
            if i + 1 < n_linears {
                x = self.activation.forward(x);
            }
        }
        x
    }

    /// 線形層の数
    pub fn num_layers(&self) -> usize {
        self.linears.len()
    }
}

/// 読み込んだレコードが設定どおりの構造を持つか検査します。
///
/// 形状の異なるレコードをそのまま `load_record` に渡すとパニックするため、適用前に呼びます。
pub fn check_record<B: Backend>(
    config: &ModelConfig,
    record: &ModelRecord<B>,
) -> crate::error::Result<()> {
    let expected = config.layer_shapes();
    if record.linears.len() != expected.len() {
        return Err(BridgeError::ArchitectureMismatch(format!(
            "線形層の数が違います (期待値: {}, 実際: {})",
            expected.len(),
            record.linears.len()
        )));
    }

    for (i, (layer, &[d_input, d_output])) in record.linears.iter().zip(&expected).enumerate() {
        let weight = layer.weight.val().dims();
        if weight != [d_input, d_output] {
            return Err(BridgeError::ArchitectureMismatch(format!(
                "{i}層目の重みの形状が違います (期待値: {:?}, 実際: {:?})",
                [d_input, d_output],
                weight
            )));
        }
        match &layer.bias {
            Some(bias) if bias.val().dims() == [d_output] => {}
            Some(bias) => {
                return Err(BridgeError::ArchitectureMismatch(format!(
                    "{i}層目のバイアスの形状が違います (期待値: {:?}, 実際: {:?})",
                    [d_output],
                    bias.val().dims()
                )));
            }
            None => {
                return Err(BridgeError::ArchitectureMismatch(format!(
                    "{i}層目にバイアスがありません"
                )));
            }
        }
    }
    Ok(())
}
