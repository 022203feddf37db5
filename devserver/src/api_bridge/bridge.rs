use super::handlers::{self, Params, Shared, SESSION_COOKIE};
use crate::config::Latency;
use crate::dataset::Dataset;
use anyhow::Context;
use std::convert::Infallible;
use std::future::Future;
use std::net::SocketAddr;
use std::sync::{Arc, PoisonError, RwLock};
use warp::{Filter, Rejection, Reply};

fn with_state(state: Shared) -> impl Filter<Extract = (Shared,), Error = Infallible> + Clone {
    warp::any().map(move || state.clone())
}

fn with_session() -> impl Filter<Extract = (Option<String>,), Error = Infallible> + Clone {
    warp::cookie::optional::<String>(SESSION_COOKIE)
}

fn with_params() -> impl Filter<Extract = (Params,), Error = Rejection> + Clone {
    warp::query::<Params>()
}

/// Sleeps for a sampled latency before the request reaches its handler.
fn with_latency(latency: Latency) -> impl Filter<Extract = (), Error = Rejection> + Clone {
    warp::any()
        .and_then(move || {
            let delay = latency.sample(&mut rand::thread_rng());
            async move {
                if !delay.is_zero() {
                    tokio::time::sleep(delay).await;
                }
                Ok::<_, Rejection>(())
            }
        })
        .untuple_one()
}

/// HTTP front of the fixture data set.
#[derive(Clone)]
pub struct ApiBridge {
    state: Shared,
    latency: Latency,
}

impl ApiBridge {
    pub fn new(data: Dataset, latency: Latency) -> Self {
        Self {
            state: Arc::new(RwLock::new(data)),
            latency,
        }
    }

    pub fn routes(
        &self,
    ) -> impl Filter<Extract = (impl Reply,), Error = Infallible> + Clone + Send + Sync + 'static
    {
        let state = with_state(self.state.clone());

        let rankings = warp::path!("restaurants" / "rankings" / "visits")
            .and(warp::get())
            .and(with_params())
            .and(state.clone())
            .and_then(handlers::visit_rankings);

        let recommend = warp::path!("restaurants" / "recommend")
            .and(warp::post())
            .and(warp::body::json())
            .and(state.clone())
            .and_then(handlers::recommend_restaurants);

        let list = warp::path!("restaurants")
            .and(warp::get())
            .and(with_params())
            .and(state.clone())
            .and_then(handlers::list_restaurants);

        let detail = warp::path!("restaurants" / u64)
            .and(warp::get())
            .and(state.clone())
            .and_then(handlers::restaurant_detail);

        let reviews = warp::path!("restaurants" / u64 / "reviews")
            .and(warp::get())
            .and(state.clone())
            .and_then(handlers::restaurant_reviews);

        let create_review = warp::path!("restaurants" / u64 / "reviews")
            .and(warp::post())
            .and(with_session())
            .and(warp::body::json())
            .and(state.clone())
            .and_then(handlers::create_review);

        let visit = warp::path!("restaurants" / u64 / "visit")
            .and(warp::post())
            .and(with_session())
            .and(state.clone())
            .and_then(handlers::record_visit);

        let login = warp::path!("auth" / "google")
            .and(warp::post())
            .and(warp::body::json())
            .and(state.clone())
            .and_then(handlers::google_login);

        let logout = warp::path!("auth" / "logout")
            .and(warp::post())
            .and(with_session())
            .and(state.clone())
            .and_then(handlers::logout);

        let me = warp::path!("users" / "me")
            .and(warp::get())
            .and(with_session())
            .and(state.clone())
            .and_then(handlers::current_user);

        let my_reviews = warp::path!("users" / "me" / "reviews")
            .and(warp::get())
            .and(with_params())
            .and(with_session())
            .and(state.clone())
            .and_then(handlers::my_reviews);

        let my_visits = warp::path!("users" / "me" / "visits")
            .and(warp::get())
            .and(with_params())
            .and(with_session())
            .and(state)
            .and_then(handlers::my_visits);

        let api = rankings
            .or(recommend)
            .or(list)
            .or(detail)
            .or(reviews)
            .or(create_review)
            .or(visit)
            .or(login)
            .or(logout)
            .or(me)
            .or(my_reviews)
            .or(my_visits);

        with_latency(self.latency)
            .and(api)
            .recover(handlers::handle_rejection)
            .with(warp::log("devserver::access"))
    }

    /// Binds `addr` and returns the bound address plus the server future,
    /// which completes once `shutdown` resolves.
    pub fn bind(
        &self,
        addr: SocketAddr,
        shutdown: impl Future<Output = ()> + Send + 'static,
    ) -> anyhow::Result<(SocketAddr, impl Future<Output = ()> + Send + 'static)> {
        warp::serve(self.routes())
            .try_bind_with_graceful_shutdown(addr, shutdown)
            .with_context(|| format!("binding fixture API on {addr}"))
    }

    /// Session cookie value for a fixture account, for scripted clients.
    pub fn open_session(&self, login_id: &str) -> Option<String> {
        self.state
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .open_session(login_id)
    }

    #[cfg(test)]
    pub fn with_data<T>(&self, f: impl FnOnce(&Dataset) -> T) -> T {
        f(&self.state.read().unwrap())
    }
}
