//! Purpose: Compose request decoding and summation into one request handler.
//! Exports: `SumService`.
//! Role: Owned service object handed to the HTTP transport; no global state.
//! Invariants: `handle` is a pure function of the body and the configured precision.

use tracing::debug;

use crate::core::error::Error;
use crate::core::numeric::decode_request;
use crate::core::sum::{Precision, sum_array};

use super::wire::SumResponse;

#[derive(Clone, Debug, Default)]
pub struct SumService {
    precision: Precision,
}

impl SumService {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_precision(mut self, precision: Precision) -> Self {
        self.precision = precision;
        self
    }

    pub fn precision(&self) -> Precision {
        self.precision
    }

    pub fn handle(&self, body: &[u8]) -> Result<SumResponse, Error> {
        let array = decode_request(body)?;
        debug!(
            kind = array.kind().as_str(),
            len = array.len(),
            "decoded sum request"
        );
        let sum = sum_array(&array, self.precision);
        Ok(SumResponse { sum: sum.value() })
    }
}

#[cfg(test)]
mod tests {
    use super::SumService;
    use crate::core::error::ErrorKind;
    use crate::core::sum::Precision;

    #[test]
    fn handles_integer_and_real_bodies() {
        let service = SumService::new();
        let ints = service
            .handle(br#"{"input": [1, 2, 3, 4, 5, 6, 7, 8]}"#)
            .expect("ints");
        assert_eq!(ints.sum, 36.0);

        let reals = service
            .handle(br#"{"input": [1.1, 2.2, 3.3, 4.4, 5.5, 6.6, 7.7, 8.8]}"#)
            .expect("reals");
        assert_eq!(reals.sum, 40.0);
    }

    #[test]
    fn precision_is_configurable() {
        let service = SumService::new().with_precision(Precision::CENTS);
        assert_eq!(service.precision(), Precision::CENTS);
        let reals = service
            .handle(br#"{"input": [1.1, 2.2, 3.3, 4.4, 5.5, 6.6, 7.7, 8.8]}"#)
            .expect("reals");
        assert_eq!(reals.sum, 39.6);
    }

    #[test]
    fn rejects_non_numeric_input() {
        let err = SumService::new()
            .handle(br#"{"input": ["a", "b"]}"#)
            .expect_err("malformed");
        assert_eq!(err.kind(), ErrorKind::MalformedPayload);
    }

    #[test]
    fn empty_input_sums_to_zero() {
        let response = SumService::new().handle(br#"{"input": []}"#).expect("empty");
        assert_eq!(response.sum, 0.0);
    }
}
