//! Protobuf and gRPC bindings
//!
//! Generated from `proto/` with `tonic-prost-build` and checked in, so
//! building this crate does not need `protoc`.

pub mod worker {
    pub mod v1 {
        include!("generated/worker/v1/worker.v1.rs");
    }
}
