pub mod edge_headers;

pub use edge_headers::edge_headers_middleware;
