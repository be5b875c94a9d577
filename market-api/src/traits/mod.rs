pub mod trend_feed;
