pub mod coupon;
pub mod fragment;
pub mod html_tag;
pub mod scrape_url;
