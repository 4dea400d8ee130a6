pub mod covariance;
