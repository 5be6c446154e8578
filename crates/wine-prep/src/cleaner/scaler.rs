//! Zero-mean / unit-variance scaling of feature columns.

use crate::error::Result;
use crate::types::ScalerParams;
use crate::utils::{finite_or_present, mean, numeric_values, std_dev};
use polars::prelude::*;
use tracing::warn;

/// Standard scaler fitted on a set of numeric columns.
///
/// Uses the population standard deviation. A column holding a single
/// distinct value has nothing to scale and becomes all zeros.
#[derive(Debug, Clone)]
pub struct StandardScaler {
    params: Vec<ScalerParams>,
}

impl StandardScaler {
    /// Fit mean and deviation of each column in `columns`.
    pub fn fit(df: &DataFrame, columns: &[String]) -> Result<Self> {
        let mut params = Vec::with_capacity(columns.len());

        for column in columns {
            let values = finite_or_present(&numeric_values(df, column)?);
            let constant = match (
                values.iter().copied().reduce(f64::min),
                values.iter().copied().reduce(f64::max),
            ) {
                (Some(min), Some(max)) => min == max,
                _ => true,
            };

            if constant {
                warn!("Column '{}' has zero variance; scaling it to all zeros", column);
            }

            params.push(ScalerParams {
                column: column.clone(),
                mean: mean(&values),
                std: std_dev(&values, 0),
                constant,
            });
        }

        Ok(Self { params })
    }

    /// Replace every fitted column of `df` with its standardized values.
    /// Missing cells stay missing.
    pub fn transform(&self, df: &mut DataFrame) -> Result<()> {
        for p in &self.params {
            let values = numeric_values(df, &p.column)?;
            let scaled: Vec<Option<f64>> = values
                .into_iter()
                .map(|v| {
                    v.map(|x| {
                        if x.is_nan() {
                            x
                        } else if p.constant {
                            0.0
                        } else {
                            (x - p.mean) / p.std
                        }
                    })
                })
                .collect();

            df.replace(&p.column, Series::new(p.column.as_str().into(), scaled))?;
        }
        Ok(())
    }

    /// Fit on `columns` of `df` and transform them in place.
    pub fn fit_transform(df: &mut DataFrame, columns: &[String]) -> Result<Self> {
        let scaler = Self::fit(df, columns)?;
        scaler.transform(df)?;
        Ok(scaler)
    }

    /// Fitted parameters, in column order.
    pub fn params(&self) -> &[ScalerParams] {
        &self.params
    }

    /// Consume the scaler, keeping only its fitted parameters.
    pub fn into_params(self) -> Vec<ScalerParams> {
        self.params
    }
}
