pub mod intrinio;
