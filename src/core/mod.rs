// Core modules implementing request decoding, summation, and error modeling.
pub mod error;
pub mod numeric;
pub mod sum;
