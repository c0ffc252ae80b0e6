//! 变更追踪领域层

pub mod entity;
pub mod repository;
pub mod service;
