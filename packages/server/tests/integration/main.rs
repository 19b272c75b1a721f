mod common;
mod leagues;
mod predictions;
mod results;
mod seasons;
