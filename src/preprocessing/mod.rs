//! Feature preprocessing
//!
//! Standardization is the only transform the prediction core needs: fit
//! once on the training partition, then apply the identical transform to
//! held-out rows and to every inference request.

mod scaler;

pub use scaler::{ScalingModel, StandardScaler};
