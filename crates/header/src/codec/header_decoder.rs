//! Header block decoder
//!
//! Reads one header block (field lines terminated by an empty line) from a byte buffer and
//! turns it into a [`HeaderCollection`], building every field through a [`HeaderFactory`].
//!
//! # Limits
//!
//! - Maximum number of fields: 64 by default
//! - Maximum block size, terminating empty line included: 8KB by default
//!
//! Lines must end with CRLF. A line starting with a space or tab continues the previous
//! field (obs-fold); the fold is kept in the value and validated with it. Field names
//! are ASCII tokens; values are kept as bytes, so obs-text survives untouched.

use bytes::{Buf, BytesMut};
use tokio_util::codec::Decoder;
use tracing::trace;

use crate::ensure;
use crate::protocol::{HeaderCollection, HeaderError, ParseError};
use crate::HeaderFactory;

/// Default maximum number of fields in a block
pub const MAX_HEADER_NUM: usize = 64;

/// Default maximum size in bytes of a block
pub const MAX_HEADER_BYTES: usize = 8 * 1024;

const BLOCK_END: &[u8] = b"\r\n\r\n";

/// Size limits applied while decoding a header block.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HeaderLimits {
    pub max_bytes: usize,
    pub max_headers: usize,
}

impl Default for HeaderLimits {
    fn default() -> Self {
        Self { max_bytes: MAX_HEADER_BYTES, max_headers: MAX_HEADER_NUM }
    }
}

/// Decoder for header blocks implementing the [`Decoder`] trait.
#[derive(Debug, Clone, Default)]
pub struct HeaderDecoder {
    factory: HeaderFactory,
    limits: HeaderLimits,
    // bytes of the pending block already searched for the terminator
    scanned: usize,
}

impl HeaderDecoder {
    /// A decoder with default limits using the process-wide registry.
    pub fn new() -> Self {
        Default::default()
    }

    pub fn with_factory(mut self, factory: HeaderFactory) -> Self {
        self.factory = factory;
        self
    }

    pub fn with_limits(mut self, limits: HeaderLimits) -> Self {
        self.limits = limits;
        self
    }

    pub fn limits(&self) -> HeaderLimits {
        self.limits
    }

    /// Splits the block into logical field lines, joining continuation lines.
    fn decode_block(&self, block: &[u8]) -> Result<HeaderCollection, ParseError> {
        let mut headers = HeaderCollection::new();
        let mut pending: Option<Vec<u8>> = None;

        for line in crlf_lines(block) {
            if matches!(line.first(), Some(b' ' | b'\t')) {
                let Some(current) = pending.as_mut() else {
                    return Err(HeaderError::malformed_line(String::from_utf8_lossy(line)).into());
                };
                current.extend_from_slice(b"\r\n");
                current.extend_from_slice(line);
                continue;
            }

            if let Some(current) = pending.replace(line.to_vec()) {
                self.push_line(&mut headers, &current)?;
            }
        }

        if let Some(current) = pending {
            self.push_line(&mut headers, &current)?;
        }
        Ok(headers)
    }

    fn push_line(&self, headers: &mut HeaderCollection, line: &[u8]) -> Result<(), ParseError> {
        ensure!(headers.count() < self.limits.max_headers, ParseError::too_many_headers(self.limits.max_headers));
        headers.append(self.factory.of_line_bytes(line)?);
        Ok(())
    }
}

/// Iterates over the CRLF-separated lines of `block`.
fn crlf_lines(block: &[u8]) -> impl Iterator<Item = &[u8]> {
    let mut rest = Some(block);
    std::iter::from_fn(move || {
        let current = rest?;
        match current.windows(2).position(|pair| pair == b"\r\n") {
            Some(index) => {
                rest = Some(&current[index + 2..]);
                Some(&current[..index])
            }
            None => {
                rest = None;
                Some(current)
            }
        }
    })
}

impl Decoder for HeaderDecoder {
    type Item = HeaderCollection;
    type Error = ParseError;

    /// Attempts to decode one header block from the buffer.
    ///
    /// # Returns
    ///
    /// - `Ok(Some(headers))` once the empty line ending the block has been read; the
    ///   block is removed from `src`
    /// - `Ok(None)` if more data is needed
    /// - `Err(ParseError)` if a limit is exceeded or a field is invalid
    fn decode(&mut self, src: &mut BytesMut) -> Result<Option<Self::Item>, Self::Error> {
        if src.is_empty() {
            return Ok(None);
        }

        // a block without fields is only the empty line
        if src.starts_with(b"\r\n") {
            self.scanned = 0;
            src.advance(2);
            return Ok(Some(HeaderCollection::new()));
        }

        // resume where the last call stopped, keeping room for a terminator split across reads
        let max_bytes = self.limits.max_bytes;
        let start = self.scanned.min(src.len()).saturating_sub(BLOCK_END.len() - 1);
        let Some(end) = src[start..].windows(BLOCK_END.len()).position(|window| window == BLOCK_END).map(|index| start + index) else {
            ensure!(src.len() <= max_bytes, ParseError::too_large_header(src.len(), max_bytes));
            self.scanned = src.len();
            return Ok(None);
        };
        self.scanned = 0;

        let block_size = end + BLOCK_END.len();
        ensure!(block_size <= max_bytes, ParseError::too_large_header(block_size, max_bytes));

        let block = src.split_to(block_size).freeze();
        let headers = self.decode_block(&block[..end])?;

        trace!(header_count = headers.count(), block_size, "decoded header block");
        Ok(Some(headers))
    }
}

#[cfg(test)]
mod tests {
    use futures::StreamExt;
    use indoc::indoc;
    use tokio_util::codec::FramedRead;

    use super::*;
    use crate::protocol::{HeaderKind, SetCookie};

    /// `indoc` keeps LF line endings, the wire format wants CRLF.
    fn crlf(block: &str) -> BytesMut {
        BytesMut::from(block.replace('\n', "\r\n").as_str())
    }

    #[test]
    fn from_curl() {
        let mut buf = crlf(indoc! {r##"
        Host: 127.0.0.1:8080
        User-Agent: curl/7.79.1
        Accept: */*

        123"##});

        let headers = HeaderDecoder::new().decode(&mut buf).unwrap().unwrap();

        assert_eq!(headers.count(), 3);
        assert_eq!(headers.get_one("host").unwrap().value(), "127.0.0.1:8080");
        assert_eq!(headers.get_one("user-agent").unwrap().value(), "curl/7.79.1");
        assert_eq!(headers.get_one("ACCEPT").unwrap().value(), "*/*");
        assert_eq!(&buf[..], &b"123"[..]);
    }

    #[test]
    fn from_edge() {
        let mut buf = crlf(indoc! {r##"
        Host: 127.0.0.1:8080
        Connection: keep-alive
        Cache-Control: max-age=0
        sec-ch-ua: "#Not_A Brand";v="99", "Microsoft Edge";v="109", "Chromium";v="109"
        sec-ch-ua-mobile: ?0
        sec-ch-ua-platform: "macOS"
        Upgrade-Insecure-Requests: 1
        User-Agent: Mozilla/5.0 (Macintosh; Intel Mac OS X 10_15_7) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/109.0.0.0 Safari/537.36 Edg/109.0.1518.52
        Accept: text/html,application/xhtml+xml,application/xml;q=0.9,image/webp,image/apng,*/*;q=0.8,application/signed-exchange;v=b3;q=0.9
        Sec-Fetch-Site: none
        Sec-Fetch-Mode: navigate
        Sec-Fetch-User: ?1
        Sec-Fetch-Dest: document
        Accept-Encoding: gzip, deflate, br
        Accept-Language: zh-CN,zh;q=0.9,en-US;q=0.8,en;q=0.7

        "##});

        let headers = HeaderDecoder::new().decode(&mut buf).unwrap().unwrap();
        assert!(buf.is_empty());
        assert_eq!(headers.count(), 15);

        assert_eq!(headers.get_one("sec-ch-ua").unwrap().value(), r##""#Not_A Brand";v="99", "Microsoft Edge";v="109", "Chromium";v="109""##);
        assert_eq!(headers.get_one("sec-ch-ua-platform").unwrap().value(), "\"macOS\"");
        assert_eq!(headers.get_one("Accept-Language").unwrap().value(), "zh-CN,zh;q=0.9,en-US;q=0.8,en;q=0.7");

        let cache_control = headers.get_one("cache-control").unwrap();
        assert_eq!(cache_control.kind(), HeaderKind::Structured);
        assert_eq!(cache_control.params().unwrap()[0].get("max-age"), Some(Some("0")));
    }

    #[test]
    fn waits_for_the_empty_line() {
        let mut decoder = HeaderDecoder::new();
        let mut buf = BytesMut::from("Host: example.com\r\nAccept: */*\r\n");
        assert!(decoder.decode(&mut buf).unwrap().is_none());
        assert_eq!(buf.len(), 32);

        buf.extend_from_slice(b"\r\n");
        let headers = decoder.decode(&mut buf).unwrap().unwrap();
        assert_eq!(headers.count(), 2);
        assert!(buf.is_empty());
    }

    #[test]
    fn keeps_obs_text_bytes() {
        let mut buf = BytesMut::from(&b"X-Name: caf\xe9\r\n\r\n"[..]);
        let headers = HeaderDecoder::new().decode(&mut buf).unwrap().unwrap();

        let name = headers.get_one("x-name").unwrap();
        assert_eq!(&name.value_bytes()[..], b"caf\xe9");
        assert_eq!(name.render_bytes(), b"X-Name: caf\xe9".to_vec());
    }

    #[test]
    fn trickled_input_resumes_the_search() {
        let input = b"Host: example.com\r\nAccept: */*\r\n\r\nrest";
        let mut decoder = HeaderDecoder::new();
        let mut buf = BytesMut::new();

        let mut decoded = None;
        for (index, byte) in input.iter().enumerate() {
            buf.extend_from_slice(&[*byte]);
            if let Some(headers) = decoder.decode(&mut buf).unwrap() {
                decoded = Some((index, headers));
                break;
            }
            assert_eq!(decoder.scanned, buf.len());
        }

        let (index, headers) = decoded.unwrap();
        assert_eq!(index, input.len() - "rest".len() - 1);
        assert_eq!(headers.count(), 2);
        assert_eq!(decoder.scanned, 0);
        assert!(buf.is_empty());
    }

    #[test]
    fn empty_block() {
        let mut decoder = HeaderDecoder::new();
        let mut buf = BytesMut::from("\r");
        assert!(decoder.decode(&mut buf).unwrap().is_none());
        buf.extend_from_slice(b"\n");
        assert!(decoder.decode(&mut buf).unwrap().unwrap().is_empty());

        let mut buf = BytesMut::from("\r\nbody");
        let headers = HeaderDecoder::new().decode(&mut buf).unwrap().unwrap();
        assert!(headers.is_empty());
        assert_eq!(&buf[..], &b"body"[..]);

        assert!(HeaderDecoder::new().decode(&mut BytesMut::new()).unwrap().is_none());
    }

    #[test]
    fn keeps_repeated_fields() {
        let mut buf = crlf(indoc! {r##"
        Set-Cookie: a=1; Path=/
        Set-Cookie: b=2; Secure

        "##});

        let headers = HeaderDecoder::new().decode(&mut buf).unwrap().unwrap();
        let cookies: Vec<_> = headers.find("set-cookie").map(|h| SetCookie::try_from(h).unwrap()).collect();
        assert_eq!(cookies.len(), 2);
        assert_eq!(cookies[0].name(), "a");
        assert_eq!(cookies[0].path(), Some("/"));
        assert!(cookies[1].secure());
    }

    #[test]
    fn joins_folded_lines() {
        let mut buf = BytesMut::from("X-Long: first\r\n  second\r\n\tthird\r\nHost: a\r\n\r\n");
        let headers = HeaderDecoder::new().decode(&mut buf).unwrap().unwrap();

        assert_eq!(headers.count(), 2);
        let long = headers.get_one("x-long").unwrap();
        assert_eq!(long.value(), "first\r\n  second\r\n\tthird");
        assert_eq!(long.unfolded_value(), "first second third");
    }

    #[test]
    fn rejects_leading_continuation() {
        let mut buf = BytesMut::from(" folded: x\r\nHost: a\r\n\r\n");
        let result = HeaderDecoder::new().decode(&mut buf);
        assert!(matches!(result, Err(ParseError::InvalidHeader { source: HeaderError::MalformedHeaderLine { .. } })));
    }

    #[test]
    fn rejects_malformed_fields() {
        let mut buf = BytesMut::from("Bad Header Name: x\r\n\r\n");
        assert!(matches!(
            HeaderDecoder::new().decode(&mut buf),
            Err(ParseError::InvalidHeader { source: HeaderError::MalformedHeaderLine { .. } })
        ));

        let mut buf = BytesMut::from("X-A: one\ntwo\r\n\r\n");
        assert!(matches!(
            HeaderDecoder::new().decode(&mut buf),
            Err(ParseError::InvalidHeader { source: HeaderError::InvalidHeaderValue { .. } })
        ));

        let mut buf = BytesMut::from(&b"X-A: \xff\r\n\r\n"[..]);
        assert!(matches!(
            HeaderDecoder::new().decode(&mut buf),
            Err(ParseError::InvalidHeader { source: HeaderError::InvalidHeaderValue { .. } })
        ));
    }

    #[test]
    fn enforces_limits() {
        let limits = HeaderLimits { max_bytes: 32, max_headers: 2 };

        let mut buf = BytesMut::from("X-A: 1\r\nX-B: 2\r\nX-C: 3\r\n\r\n");
        assert!(matches!(
            HeaderDecoder::new().with_limits(limits).decode(&mut buf),
            Err(ParseError::TooManyHeaders { max_num: 2 })
        ));

        let mut buf = BytesMut::from("X-Long: 0123456789012345678901234567890123456789");
        assert!(matches!(
            HeaderDecoder::new().with_limits(limits).decode(&mut buf),
            Err(ParseError::TooLargeHeader { max_size: 32, .. })
        ));

        let mut buf = BytesMut::from("X-Long: 01234567890123456789012\r\n\r\n");
        assert!(matches!(
            HeaderDecoder::new().with_limits(limits).decode(&mut buf),
            Err(ParseError::TooLargeHeader { current_size: 35, max_size: 32 })
        ));
    }

    #[tokio::test]
    async fn framed_read_yields_each_block() {
        let input: &[u8] = b"Host: a\r\n\r\nHost: b\r\nSet-Cookie: x=1\r\n\r\n";
        let mut framed = FramedRead::new(input, HeaderDecoder::new());

        let first = framed.next().await.unwrap().unwrap();
        assert_eq!(first.get_one("host").unwrap().value(), "a");

        let second = framed.next().await.unwrap().unwrap();
        assert_eq!(second.count(), 2);
        assert_eq!(second.get_one("set-cookie").unwrap().kind(), HeaderKind::SetCookie);

        assert!(framed.next().await.is_none());
    }
}
