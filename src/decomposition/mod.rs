//! Dimensionality reduction on standardized features.
//!
//! This module provides:
//! - `Pca`: Principal Component Analysis for unsupervised dimensionality reduction
//! - `Lda`: Linear Discriminant Analysis for supervised dimensionality reduction
//!
//! Both standardize the input first, decompose a feature-space matrix with
//! an [`EigenSolver`](crate::EigenSolver), keep the `k` leading eigenvectors
//! and project the standardized data onto them.
//!
//! # Examples
//!
//! ## Principal Component Analysis (PCA)
//! ```rust
//! use tabular_reduce::Pca;
//! use ndarray::array;
//!
//! let x = array![
//!     [1.0, 2.0, 3.0],
//!     [4.0, 5.0, 7.0],
//!     [7.0, 8.0, 8.0],
//!     [10.0, 11.0, 12.0]
//! ];
//!
//! let fit = Pca::new(2).fit(&x).unwrap();
//! assert_eq!(fit.transformed.shape(), &[4, 2]);
//! println!("Explained variance ratio: {:?}", fit.explained_variance_ratio);
//! ```
//!
//! ## Linear Discriminant Analysis (LDA)
//! ```rust
//! use tabular_reduce::Lda;
//! use ndarray::array;
//!
//! let x = array![
//!     [1.0, 1.2],
//!     [2.0, 1.8],
//!     [1.5, 2.5],
//!     [8.0, 8.4],
//!     [9.0, 8.7],
//!     [8.5, 9.9]
//! ];
//! let y = ["low", "low", "low", "high", "high", "high"];
//!
//! let fit = Lda::new(1).fit(&x, &y).unwrap();
//! let predictions = fit.predict(&x).unwrap();
//! assert_eq!(predictions[0], "low");
//! ```

mod lda;
mod pca;

pub use lda::{Lda, LdaFit};
pub use pca::{Pca, PcaFit};
