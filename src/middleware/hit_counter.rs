/// Counts every request that passes through it
///
/// Wrapped around the static file scope so `/admin/metrics` can report
/// how often the site was visited.

use actix_web::{
    dev::{forward_ready, Service, ServiceRequest, ServiceResponse, Transform},
    Error,
};
use futures::future::LocalBoxFuture;
use std::rc::Rc;

use crate::metrics::HitCounter;

pub struct FileServerHits {
    counter: HitCounter,
}

impl FileServerHits {
    pub fn new(counter: HitCounter) -> Self {
        Self { counter }
    }
}

impl<S, B> Transform<S, ServiceRequest> for FileServerHits
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<B>;
    type Error = Error;
    type InitError = ();
    type Transform = FileServerHitsService<S>;
    type Future = std::future::Ready<Result<Self::Transform, Self::InitError>>;

    fn new_transform(&self, service: S) -> Self::Future {
        std::future::ready(Ok(FileServerHitsService {
            service: Rc::new(service),
            counter: self.counter.clone(),
        }))
    }
}

pub struct FileServerHitsService<S> {
    service: Rc<S>,
    counter: HitCounter,
}

impl<S, B> Service<ServiceRequest> for FileServerHitsService<S>
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<B>;
    type Error = Error;
    type Future = LocalBoxFuture<'static, Result<Self::Response, Self::Error>>;

    forward_ready!(service);

    fn call(&self, req: ServiceRequest) -> Self::Future {
        let hits = self.counter.record();
        tracing::trace!(hits, path = %req.path(), "File server hit");

        let service = self.service.clone();
        Box::pin(async move { service.call(req).await })
    }
}
