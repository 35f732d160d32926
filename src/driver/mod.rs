//! Drivers that walk the rows of `A` and run the accumulator/selector/buffer
//! pipeline: [`sequential`] always available, [`parallel`] behind the
//! `parallel` feature (spec §4.5/§4.6).

pub mod sequential;

#[cfg(feature = "parallel")]
pub mod parallel;
