//! A rust library for cross-validating pixel sources of 5D (XYZCT) microscopy pixel arrays.
//!
//! A pixel array is stored as raw samples in XYZCT order: X varies fastest, then Y, Z, C (channel) and T (time).
//! `pixelcube` checks that a source which can serve arbitrary strided hypercubes directly agrees with a source that can only serve rows (raw byte ranges at row offsets).
//! Hypercubes are rebuilt from the row source and compared against the direct source by length and SHA-256 digest.
//!
//! ## Getting Started
//! - [`pixels`] describes the layout of a pixel array: its [`PixelType`](pixels::PixelType) and [`PixelsDimensions`](pixels::PixelsDimensions).
//! - [`hypercube`] describes strided hypercube requests and their canonical T, C, Z, Y, X iteration order.
//! - [`source`] defines the [`DirectHypercubeSourceTraits`](source::DirectHypercubeSourceTraits) and [`RowHypercubeSourceTraits`](source::RowHypercubeSourceTraits) interfaces, and includes in-memory and filesystem sources.
//! - [`oracle`] reconstructs hypercubes from row sources and runs the comparison suite.
//!
//! ## Example
//! ```rust
//! # use std::sync::Arc;
//! use pixelcube::hypercube::HypercubeRequest;
//! use pixelcube::oracle::{assert_equivalent, reconstruct_strided};
//! use pixelcube::pixels::{PixelType, PixelsDescriptor, PixelsDimensions};
//! use pixelcube::source::{DirectHypercubeSourceTraits, MemoryPixelsSource};
//!
//! let descriptor = PixelsDescriptor::new(PixelsDimensions::new(10, 10, 1, 1, 1), PixelType::Uint16);
//! let source = MemoryPixelsSource::from_elements(descriptor, &(0..100u16).collect::<Vec<_>>())?;
//!
//! let request = HypercubeRequest::new([0; 5], [10, 10, 1, 1, 1], [2, 2, 1, 1, 1])?;
//! let direct = source.get_hypercube(&request)?;
//! let reconstructed = reconstruct_strided(&source, &request)?;
//! assert_eq!(reconstructed.len(), 50);
//! assert_equivalent(&direct, &reconstructed)?;
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```
//!
//! ## Licence
//! `pixelcube` is licensed under either of
//!  - the Apache License, Version 2.0 <http://www.apache.org/licenses/LICENSE-2.0> or
//!  - the MIT license <http://opensource.org/licenses/MIT>, at your option.

#![warn(unused_variables)]
#![warn(dead_code)]
#![deny(missing_docs)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![deny(clippy::missing_panics_doc)]
#![cfg_attr(docsrs, feature(doc_auto_cfg))]

pub mod byte_range;
pub mod config;
pub mod hypercube;
pub mod oracle;
pub mod pixels;
pub mod source;
