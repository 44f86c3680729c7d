//! Descriptive statistics over slices of floating point values

use crate::{MathError, Result};
use num_traits::Float;

/// Arithmetic mean of the values
pub fn mean<T: Float>(values: &[T]) -> Result<T> {
    if values.is_empty() {
        return Err(MathError::InsufficientData(
            "Cannot compute the mean of an empty slice".to_string(),
        ));
    }

    let sum = values.iter().fold(T::zero(), |acc, &v| acc + v);
    let n = T::from(values.len()).ok_or_else(|| {
        MathError::CalculationError("Length is not representable".to_string())
    })?;

    Ok(sum / n)
}

/// Population standard deviation (divides by n)
pub fn std_dev<T: Float>(values: &[T]) -> Result<T> {
    let m = mean(values)?;
    let n = T::from(values.len()).ok_or_else(|| {
        MathError::CalculationError("Length is not representable".to_string())
    })?;
    let ss = values.iter().fold(T::zero(), |acc, &v| acc + (v - m) * (v - m));

    Ok((ss / n).sqrt())
}

/// Sample standard deviation (divides by n - 1)
pub fn sample_std_dev<T: Float>(values: &[T]) -> Result<T> {
    if values.len() < 2 {
        return Err(MathError::InsufficientData(format!(
            "Sample standard deviation needs at least 2 values, have {}",
            values.len()
        )));
    }

    let m = mean(values)?;
    let dof = T::from(values.len() - 1).ok_or_else(|| {
        MathError::CalculationError("Length is not representable".to_string())
    })?;
    let ss = values.iter().fold(T::zero(), |acc, &v| acc + (v - m) * (v - m));

    Ok((ss / dof).sqrt())
}

/// Median of the values; NaNs are rejected
pub fn median<T: Float>(values: &[T]) -> Result<T> {
    if values.is_empty() {
        return Err(MathError::InsufficientData(
            "Cannot compute the median of an empty slice".to_string(),
        ));
    }
    if values.iter().any(|v| v.is_nan()) {
        return Err(MathError::InvalidInput(
            "Median is undefined for NaN values".to_string(),
        ));
    }

    let mut sorted = values.to_vec();
    sorted.sort_by(|a, b| a.partial_cmp(b).unwrap_or(std::cmp::Ordering::Equal));

    let mid = sorted.len() / 2;
    if sorted.len() % 2 == 0 {
        let two = T::one() + T::one();
        Ok((sorted[mid - 1] + sorted[mid]) / two)
    } else {
        Ok(sorted[mid])
    }
}

/// Minimum and maximum of the values
pub fn min_max<T: Float>(values: &[T]) -> Result<(T, T)> {
    let first = *values.first().ok_or_else(|| {
        MathError::InsufficientData("Cannot compute extremes of an empty slice".to_string())
    })?;

    Ok(values
        .iter()
        .fold((first, first), |(lo, hi), &v| (lo.min(v), hi.max(v))))
}
