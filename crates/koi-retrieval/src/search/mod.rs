pub mod vector_search;
