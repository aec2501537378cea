//! Declared request pipeline.
//!
//! Stage order is a checked configuration value rather than a side effect
//! of the order `.layer()` calls happen to be written in. A [`Pipeline`]
//! can only be built from a list that satisfies every stage's requirements,
//! and [`Pipeline::apply`] installs the stages so that the first listed
//! stage sees the request first.

use axum::{extract::DefaultBodyLimit, middleware, Router};
use axum_login::AuthManagerLayerBuilder;
use std::sync::Arc;
use thiserror::Error;
use tower_cookies::CookieManagerLayer;
use tower_http::trace::TraceLayer;
use tower_sessions::{cookie::SameSite, Expiry, SessionManagerLayer};

use crate::middleware::{
    authentication_middleware, flash_relay_middleware, session_middleware,
    static_assets_middleware, view_context_middleware, StaticAssets,
};
use crate::session;
use crate::state::AppState;

/// Pipeline stages in canonical execution order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[repr(u8)]
pub enum PipelineStage {
    RequestLogger = 0,  // Trace every request and response
    BodyParser = 1,     // Cap request bodies for form and JSON extractors
    CookieParser = 2,   // Parse the Cookie header into a jar
    StaticAssets = 3,   // Short-circuit on files under the public root
    Session = 4,        // Load the session and login, persist them after the handler
    Authentication = 5, // Classify the login as an AuthState
    FlashRelay = 6,     // Drain queued flash messages
    ViewContext = 7,    // Expose currentUser and messages to views
}

impl PipelineStage {
    pub const ALL: [PipelineStage; 8] = [
        PipelineStage::RequestLogger,
        PipelineStage::BodyParser,
        PipelineStage::CookieParser,
        PipelineStage::StaticAssets,
        PipelineStage::Session,
        PipelineStage::Authentication,
        PipelineStage::FlashRelay,
        PipelineStage::ViewContext,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            PipelineStage::RequestLogger => "request_logger",
            PipelineStage::BodyParser => "body_parser",
            PipelineStage::CookieParser => "cookie_parser",
            PipelineStage::StaticAssets => "static_assets",
            PipelineStage::Session => "session",
            PipelineStage::Authentication => "authentication",
            PipelineStage::FlashRelay => "flash_relay",
            PipelineStage::ViewContext => "view_context",
        }
    }

    pub fn descriptor(&self) -> StageDescriptor {
        use PipelineStage::*;

        let (requires, provides): (&'static [PipelineStage], &'static str) = match self {
            RequestLogger => (&[], "request/response trace spans"),
            BodyParser => (&[], "request body size limit"),
            CookieParser => (&[], "cookie jar"),
            StaticAssets => (&[], "public files, served without a session"),
            Session => (&[CookieParser], "session handle and login session, persisted after the handler"),
            Authentication => (&[Session], "auth state (principal or none)"),
            FlashRelay => (&[Session], "flash messages queued by the previous request"),
            ViewContext => (&[Authentication, FlashRelay], "render context: currentUser, messages"),
        };

        StageDescriptor {
            stage: *self,
            requires,
            provides,
        }
    }
}

impl std::fmt::Display for PipelineStage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// Pre- and post-conditions of a stage
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StageDescriptor {
    pub stage: PipelineStage,
    /// Stages that must run earlier in the same pipeline
    pub requires: &'static [PipelineStage],
    /// What the stage adds to the request
    pub provides: &'static str,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PipelineError {
    #[error("Stage '{0}' is listed more than once")]
    Duplicate(PipelineStage),

    #[error("Stage '{stage}' requires '{requires}', which is not in the pipeline")]
    MissingRequirement {
        stage: PipelineStage,
        requires: PipelineStage,
    },

    #[error("Stage '{stage}' must run after '{requires}'")]
    OutOfOrder {
        stage: PipelineStage,
        requires: PipelineStage,
    },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Pipeline {
    stages: Vec<PipelineStage>,
}

impl Pipeline {
    /// Every stage, in canonical order
    pub fn standard() -> Self {
        Self {
            stages: PipelineStage::ALL.to_vec(),
        }
    }

    pub fn from_stages(stages: Vec<PipelineStage>) -> Result<Self, PipelineError> {
        for (index, stage) in stages.iter().enumerate() {
            if stages[..index].contains(stage) {
                return Err(PipelineError::Duplicate(*stage));
            }

            for required in stage.descriptor().requires {
                match stages.iter().position(|s| s == required) {
                    None => {
                        return Err(PipelineError::MissingRequirement {
                            stage: *stage,
                            requires: *required,
                        })
                    }
                    Some(at) if at > index => {
                        return Err(PipelineError::OutOfOrder {
                            stage: *stage,
                            requires: *required,
                        })
                    }
                    Some(_) => {}
                }
            }
        }

        Ok(Self { stages })
    }

    pub fn stages(&self) -> &[PipelineStage] {
        &self.stages
    }

    pub fn describe(&self) -> Vec<StageDescriptor> {
        self.stages.iter().map(PipelineStage::descriptor).collect()
    }

    /// Wrap `router` in every stage. Layers are added innermost first so the
    /// first listed stage ends up outermost.
    pub fn apply(&self, router: Router, state: &AppState) -> Router {
        self.stages
            .iter()
            .rev()
            .fold(router, |router, stage| Self::install(*stage, router, state))
    }

    fn install(stage: PipelineStage, router: Router, state: &AppState) -> Router {
        match stage {
            PipelineStage::RequestLogger => router.layer(TraceLayer::new_for_http()),
            PipelineStage::BodyParser => {
                router.layer(DefaultBodyLimit::max(state.config.server.body_limit_bytes))
            }
            PipelineStage::CookieParser => router.layer(CookieManagerLayer::new()),
            PipelineStage::StaticAssets => {
                let assets = Arc::new(StaticAssets::new(state.config.server.public_dir.clone()));
                tracing::debug!("Serving static files from {}", assets.root().display());
                router.layer(middleware::from_fn_with_state(assets, static_assets_middleware))
            }
            PipelineStage::Session => {
                let cfg = &state.config.session;
                let sessions = SessionManagerLayer::new(state.sessions.clone())
                    .with_name(cfg.cookie_name.clone())
                    .with_secure(cfg.secure_cookie)
                    .with_same_site(SameSite::Lax)
                    .with_http_only(true)
                    .with_expiry(Expiry::OnInactivity(session::inactivity(cfg.ttl_secs)))
                    .with_signed(session::signing_key(&cfg.secret));
                let login = AuthManagerLayerBuilder::new(state.authenticator.clone(), sessions).build();
                router
                    .layer(middleware::from_fn(session_middleware))
                    .layer(login)
            }
            PipelineStage::Authentication => {
                router.layer(middleware::from_fn(authentication_middleware))
            }
            PipelineStage::FlashRelay => router.layer(middleware::from_fn(flash_relay_middleware)),
            PipelineStage::ViewContext => router.layer(middleware::from_fn_with_state(
                state.clone(),
                view_context_middleware,
            )),
        }
    }
}
