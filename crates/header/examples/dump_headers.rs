//! Reads header blocks from stdin and prints each one grouped by name.
//!
//! ```sh
//! printf 'Host: a\r\nSet-Cookie: x=1\r\nSet-Cookie: y=2\r\n\r\n' | cargo run --example dump_headers
//! ```

use futures::StreamExt;
use micro_header::codec::HeaderDecoder;
use tokio_util::codec::FramedRead;
use tracing::{Level, error, info};
use tracing_subscriber::FmtSubscriber;

#[tokio::main]
async fn main() {
    let subscriber = FmtSubscriber::builder().with_max_level(Level::DEBUG).finish();
    tracing::subscriber::set_global_default(subscriber).expect("setting default subscriber failed");

    let mut blocks = FramedRead::new(tokio::io::stdin(), HeaderDecoder::new());

    let mut index = 0usize;
    while let Some(result) = blocks.next().await {
        match result {
            Ok(headers) => {
                info!(block = index, count = headers.count(), "decoded header block");
                for (name, values) in headers.to_grouped() {
                    println!("{name}: {values:?}");
                }
                println!();
                index += 1;
            }
            Err(e) => {
                error!(cause = %e, "failed to decode header block");
                return;
            }
        }
    }
}
