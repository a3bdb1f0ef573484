mod cumulative_moving_average;

pub use cumulative_moving_average::CumulativeMovingAverage;
