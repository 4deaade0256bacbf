pub mod dive;
