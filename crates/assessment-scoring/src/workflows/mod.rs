pub mod scaled_score;
