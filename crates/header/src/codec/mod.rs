//! Header block codec
//!
//! Connects the header model to byte buffers so a message layer can read and write the
//! header section of an HTTP/1.x message with `tokio_util` framing.
//!
//! - [`HeaderDecoder`]: decodes one header block into a
//!   [`HeaderCollection`](crate::protocol::HeaderCollection)
//!   - joins obs-fold continuation lines
//!   - enforces [`HeaderLimits`]
//!   - builds every field through a [`HeaderFactory`](crate::HeaderFactory)
//!
//! - [`HeaderEncoder`]: writes a collection back as a header block
//!
//! # Example
//!
//! ```
//! use bytes::BytesMut;
//! use micro_header::codec::{HeaderDecoder, HeaderEncoder};
//! use tokio_util::codec::{Decoder, Encoder};
//!
//! let mut buf = BytesMut::from("Host: example.com\r\nSet-Cookie: a=1\r\nSet-Cookie: b=2\r\n\r\n");
//! let headers = HeaderDecoder::new().decode(&mut buf).unwrap().unwrap();
//! assert_eq!(headers.find("set-cookie").count(), 2);
//!
//! let mut out = BytesMut::new();
//! HeaderEncoder.encode(&headers, &mut out).unwrap();
//! assert_eq!(&out[..], &b"Host: example.com\r\nSet-Cookie: a=1\r\nSet-Cookie: b=2\r\n\r\n"[..]);
//! ```

mod header_decoder;
mod header_encoder;

pub use header_decoder::{HeaderDecoder, HeaderLimits, MAX_HEADER_BYTES, MAX_HEADER_NUM};
pub use header_encoder::HeaderEncoder;
