//! Candidate lists used by the command line tools

use crate::fitter::{Order, SeasonalOrder};
use crate::search::ModelCandidate;

/// Average-price candidates for seasonal period `period`
pub fn price_candidates(period: usize) -> Vec<ModelCandidate> {
    vec![
        ModelCandidate::new(Order::new(1, 1, 1), SeasonalOrder::new(0, 1, 1, period)),
        ModelCandidate::new(Order::new(1, 1, 0), SeasonalOrder::new(0, 1, 1, period)),
        ModelCandidate::new(Order::new(0, 1, 1), SeasonalOrder::new(0, 1, 1, period)),
        ModelCandidate::new(Order::new(2, 1, 2), SeasonalOrder::new(1, 1, 1, period)),
        ModelCandidate::new(Order::new(1, 1, 1), SeasonalOrder::new(1, 1, 0, period)),
    ]
}

/// Transaction-volume candidates for seasonal period `period`
pub fn volume_candidates(period: usize, frequency_name: &str) -> Vec<ModelCandidate> {
    vec![
        ModelCandidate::new(Order::new(1, 1, 1), SeasonalOrder::new(0, 1, 1, period))
            .labelled(format!("Basic SARIMA ({})", frequency_name)),
        ModelCandidate::new(Order::new(0, 1, 1), SeasonalOrder::new(0, 1, 1, period))
            .labelled(format!("Pure MA ({})", frequency_name)),
        ModelCandidate::new(Order::new(1, 1, 0), SeasonalOrder::new(1, 1, 0, period))
            .labelled(format!("AR with Seasonal ({})", frequency_name)),
        ModelCandidate::new(Order::new(2, 1, 2), SeasonalOrder::new(1, 1, 1, period))
            .labelled(format!("Complex Model ({})", frequency_name)),
    ]
}
