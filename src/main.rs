//! # PINN 推論ブリッジ
//!
//! 学習済みの PINN チェックポイントを読み込み、コマンドライン引数で与えたスカラー値に対する
//! 予測値をファイルに書き出します。呼び出し元のプロセスはそのファイルを読んで結果を受け取ります。
//!
//! ## 使い方
//!
//! ```bash
//! cargo run --release -- 2.5 --model pinn_model.mpk --output /tmp/pinn_output.txt
//! ```
//!
//! 成功すると終了コード0で終わります。失敗した場合は標準エラー出力にメッセージを出し、
//! 0以外の終了コードで終わります。

use clap::Parser;
use pinn_bridge::cli::Cli;
use pinn_bridge::inference;
use std::process::ExitCode;
use tracing_subscriber::EnvFilter;

/// プログラムのエントリーポイント。
fn main() -> ExitCode {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    match inference::run(&cli) {
        Ok(prediction) => {
            if cli.print {
                println!("{prediction}");
            }
            ExitCode::SUCCESS
        }
        Err(e) => {
            eprintln!("エラー: {e}");
            ExitCode::from(e.exit_code())
        }
    }
}

/// ログの出力先を標準エラー出力に設定します。`RUST_LOG` が指定されていればそちらを優先します。
fn init_tracing(verbose: bool) {
    let filter = if verbose {
        "pinn_bridge=info"
    } else {
        "pinn_bridge=warn"
    };
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| filter.into()))
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}
