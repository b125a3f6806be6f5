#![forbid(unsafe_code)]

pub mod dto;
pub mod errors;
pub mod params;

pub const CRATE_NAME: &str = "shipguard-api";

pub use dto::{
    CartItemDto, CartSnapshotDto, DesiredState, PreviewResponseDto, RecalculateRequestDto,
    RecalculateResponseDto, SetInsuranceRequestDto, SetInsuranceResponseDto,
};
pub use errors::{ApiError, ApiErrorCode};
