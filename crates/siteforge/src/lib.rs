//! SiteForge — core pipeline library: static site generation, container image
//! builds, and object-storage deployment.

pub mod config;
pub mod container;
pub mod generator;
pub mod pipeline;
pub mod sign;
pub mod storage;
pub mod templates;
pub mod types;

pub use config::AgentConfig;
pub use container::{containerize, validate_image_name, ContainerEngine, DockerEngine};
pub use generator::{generate, slugify, INDEX_DOCUMENT};
pub use pipeline::{Coordinator, DeployRequest, PipelineReport, PipelineRequest, PipelineStage};
pub use storage::{content_type_for, publish, validate_bucket_name, ObjectStore, SpacesClient};
pub use types::*;
