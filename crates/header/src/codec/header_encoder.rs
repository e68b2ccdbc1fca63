//! Header block encoder
//!
//! Writes a [`HeaderCollection`] as field lines, each followed by CRLF, and the empty
//! line that ends the block. Values go through the render-time filter, so a block
//! written here never carries a stray CR or LF.

use bytes::{BufMut, BytesMut};
use tokio_util::codec::Encoder;

use crate::protocol::{Header, HeaderCollection, SendError};

/// Encoder for header blocks implementing the [`Encoder`] trait.
#[derive(Debug, Clone, Copy, Default)]
pub struct HeaderEncoder;

impl HeaderEncoder {
    pub fn new() -> Self {
        HeaderEncoder
    }
}

impl Encoder<&HeaderCollection> for HeaderEncoder {
    type Error = SendError;

    fn encode(&mut self, item: &HeaderCollection, dst: &mut BytesMut) -> Result<(), Self::Error> {
        let lines: Vec<Vec<u8>> = item.iter().map(Header::render_bytes).collect();
        dst.reserve(lines.iter().map(|line| line.len() + 2).sum::<usize>() + 2);

        for line in &lines {
            dst.put_slice(line);
            dst.put_slice(b"\r\n");
        }
        dst.put_slice(b"\r\n");
        Ok(())
    }
}

impl Encoder<HeaderCollection> for HeaderEncoder {
    type Error = SendError;

    fn encode(&mut self, item: HeaderCollection, dst: &mut BytesMut) -> Result<(), Self::Error> {
        <Self as Encoder<&HeaderCollection>>::encode(self, &item, dst)
    }
}

#[cfg(test)]
mod tests {
    use tokio_util::codec::Decoder;

    use super::*;
    use crate::codec::HeaderDecoder;
    use crate::HeaderFactory;

    #[test]
    fn writes_lines_and_terminator() {
        let factory = HeaderFactory::default();
        let mut headers = HeaderCollection::new();
        headers
            .append(factory.of("Host: example.com").unwrap())
            .append(factory.of(("WWW-Authenticate", r#"Basic realm="admin_panel""#)).unwrap())
            .append(factory.of("Set-Cookie: a=1").unwrap())
            .append(factory.of("Set-Cookie: b=2").unwrap());

        let mut dst = BytesMut::new();
        HeaderEncoder.encode(&headers, &mut dst).unwrap();
        assert_eq!(
            &dst[..],
            &b"Host: example.com\r\nWWW-Authenticate: Basic realm=\"admin_panel\"\r\nSet-Cookie: a=1\r\nSet-Cookie: b=2\r\n\r\n"[..]
        );
    }

    #[test]
    fn empty_collection_is_a_bare_crlf() {
        let mut dst = BytesMut::new();
        HeaderEncoder::new().encode(HeaderCollection::new(), &mut dst).unwrap();
        assert_eq!(&dst[..], &b"\r\n"[..]);
    }

    #[test]
    fn decode_what_was_encoded() {
        let headers: HeaderCollection = ["Content-Type: text/html; charset=utf-8", "X-Fold: a\r\n b", "x-lower: v"]
            .into_iter()
            .map(|line| HeaderFactory::default().of(line).unwrap())
            .collect();

        let mut buf = BytesMut::new();
        HeaderEncoder.encode(&headers, &mut buf).unwrap();
        let decoded = HeaderDecoder::new().decode(&mut buf).unwrap().unwrap();

        assert_eq!(decoded, headers);
        assert!(buf.is_empty());
    }

    #[test]
    fn obs_text_round_trips_byte_for_byte() {
        let input: &[u8] = b"X-Name: caf\xe9\r\nX-Other: plain\r\n\r\n";
        let headers = HeaderDecoder::new().decode(&mut BytesMut::from(input)).unwrap().unwrap();

        let mut dst = BytesMut::new();
        HeaderEncoder.encode(&headers, &mut dst).unwrap();
        assert_eq!(&dst[..], input);
    }

    #[test]
    fn output_never_splits() {
        let mut header = Header::new("X-Safe", "ok").unwrap();
        header.set_label("X-Renamed").unwrap();
        let headers: HeaderCollection = std::iter::once(header).collect();

        let mut dst = BytesMut::new();
        HeaderEncoder.encode(&headers, &mut dst).unwrap();
        let text = std::str::from_utf8(&dst).unwrap();
        assert_eq!(text.matches("\r\n").count(), 2);
    }
}
