//! Arrow Flight service over a [`Catalog`].
//!
//! Only the read-side RPCs are served: ListFlights, GetFlightInfo,
//! GetSchema and DoGet. Everything else answers `Unimplemented`. Catalog
//! calls block on the filesystem, so they run on the blocking pool.

use std::future::Future;
use std::net::SocketAddr;

use arrow::ipc::writer::IpcWriteOptions;
use arrow_flight::encode::FlightDataEncoderBuilder;
use arrow_flight::error::FlightError;
use arrow_flight::flight_service_server::{FlightService, FlightServiceServer};
use arrow_flight::{
    Action, ActionType, Criteria, Empty, FlightData, FlightDescriptor, FlightInfo,
    HandshakeRequest, HandshakeResponse, PollInfo, PutResult, SchemaAsIpc, SchemaResult, Ticket,
};
use futures::stream::{BoxStream, StreamExt, TryStreamExt};
use tokio::net::TcpListener;
use tonic::transport::Server;
use tonic::{Request, Response, Status, Streaming};

use crate::catalog::{Catalog, DatasetDescriptor, DatasetInfo};
use crate::error::CatalogError;
use crate::stream::pull_blocking;

/// Flight service answering from one catalog.
#[derive(Clone, Debug)]
pub struct CatalogFlightService {
    catalog: Catalog,
}

impl CatalogFlightService {
    pub fn new(catalog: Catalog) -> Self {
        Self { catalog }
    }

    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    /// Wrap the service for registration with a tonic server.
    pub fn into_server(self) -> FlightServiceServer<Self> {
        FlightServiceServer::new(self)
    }

    async fn resolve(&self, descriptor: &FlightDescriptor) -> Result<DatasetInfo, Status> {
        let descriptor = DatasetDescriptor::try_from(descriptor)?;
        let catalog = self.catalog.clone();
        let info = tokio::task::spawn_blocking(move || catalog.resolve_descriptor(&descriptor))
            .await
            .map_err(|join_error| Status::internal(format!("resolve task failed: {join_error}")))?;
        Ok(info?)
    }
}

#[tonic::async_trait]
impl FlightService for CatalogFlightService {
    type HandshakeStream = BoxStream<'static, Result<HandshakeResponse, Status>>;
    type ListFlightsStream = BoxStream<'static, Result<FlightInfo, Status>>;
    type DoGetStream = BoxStream<'static, Result<FlightData, Status>>;
    type DoPutStream = BoxStream<'static, Result<PutResult, Status>>;
    type DoActionStream = BoxStream<'static, Result<arrow_flight::Result, Status>>;
    type ListActionsStream = BoxStream<'static, Result<ActionType, Status>>;
    type DoExchangeStream = BoxStream<'static, Result<FlightData, Status>>;

    async fn handshake(
        &self,
        _request: Request<Streaming<HandshakeRequest>>,
    ) -> Result<Response<Self::HandshakeStream>, Status> {
        Err(Status::unimplemented("handshake is not supported"))
    }

    async fn list_flights(
        &self,
        request: Request<Criteria>,
    ) -> Result<Response<Self::ListFlightsStream>, Status> {
        let criteria = request.into_inner();
        tracing::info!(criteria_bytes = criteria.expression.len(), "ListFlights");

        let catalog = self.catalog.clone();
        let listing = tokio::task::spawn_blocking(move || catalog.list_all())
            .await
            .map_err(|join_error| Status::internal(format!("listing task failed: {join_error}")))??;

        let infos = pull_blocking(listing)
            .map(|item| item.and_then(|info| info.to_flight_info()))
            .map_err(Status::from)
            .boxed();
        Ok(Response::new(infos))
    }

    async fn get_flight_info(
        &self,
        request: Request<FlightDescriptor>,
    ) -> Result<Response<FlightInfo>, Status> {
        let descriptor = request.into_inner();
        tracing::info!(?descriptor, "GetFlightInfo");

        let info = self.resolve(&descriptor).await?;
        Ok(Response::new(info.to_flight_info()?))
    }

    async fn poll_flight_info(
        &self,
        _request: Request<FlightDescriptor>,
    ) -> Result<Response<PollInfo>, Status> {
        Err(Status::unimplemented("poll_flight_info is not supported"))
    }

    async fn get_schema(
        &self,
        request: Request<FlightDescriptor>,
    ) -> Result<Response<SchemaResult>, Status> {
        let descriptor = request.into_inner();
        tracing::info!(?descriptor, "GetSchema");

        let info = self.resolve(&descriptor).await?;
        let result: SchemaResult = SchemaAsIpc::new(&info.schema, &IpcWriteOptions::default())
            .try_into()
            .map_err(|source| Status::internal(format!("schema encoding failed: {source}")))?;
        Ok(Response::new(result))
    }

    async fn do_get(
        &self,
        request: Request<Ticket>,
    ) -> Result<Response<Self::DoGetStream>, Status> {
        let ticket = request.into_inner().ticket;
        tracing::info!(ticket = %String::from_utf8_lossy(&ticket), "DoGet");

        let catalog = self.catalog.clone();
        let (schema, batches) = tokio::task::spawn_blocking(move || catalog.open_stream(&ticket))
            .await
            .map_err(|join_error| Status::internal(format!("open task failed: {join_error}")))??;

        let batches = batches.map_err(|error| FlightError::from(Status::from(error)));
        let encoded = FlightDataEncoderBuilder::new()
            .with_schema(schema)
            .build(batches)
            .map_err(Status::from)
            .boxed();
        Ok(Response::new(encoded))
    }

    async fn do_put(
        &self,
        _request: Request<Streaming<FlightData>>,
    ) -> Result<Response<Self::DoPutStream>, Status> {
        Err(Status::unimplemented("the catalog is read-only"))
    }

    async fn do_action(
        &self,
        _request: Request<Action>,
    ) -> Result<Response<Self::DoActionStream>, Status> {
        Err(Status::unimplemented("no actions are supported"))
    }

    async fn list_actions(
        &self,
        _request: Request<Empty>,
    ) -> Result<Response<Self::ListActionsStream>, Status> {
        Err(Status::unimplemented("no actions are supported"))
    }

    async fn do_exchange(
        &self,
        _request: Request<Streaming<FlightData>>,
    ) -> Result<Response<Self::DoExchangeStream>, Status> {
        Err(Status::unimplemented("do_exchange is not supported"))
    }
}

/// Serve the catalog on `listener` until `shutdown` resolves.
pub async fn serve_with_listener<F>(
    catalog: Catalog,
    listener: TcpListener,
    shutdown: F,
) -> Result<(), CatalogError>
where
    F: Future<Output = ()> + Send,
{
    let local = listener
        .local_addr()
        .map_err(|source| CatalogError::Transport(format!("listener has no address: {source}")))?;
    tracing::info!(
        listen = %local,
        root = %catalog.repository().root().display(),
        location = catalog.location(),
        "serving flight catalog"
    );

    let incoming = Box::pin(futures::stream::unfold(listener, |listener| async move {
        let accepted = listener.accept().await.map(|(stream, _)| stream);
        Some((accepted, listener))
    }));

    Server::builder()
        .add_service(CatalogFlightService::new(catalog).into_server())
        .serve_with_incoming_shutdown(incoming, shutdown)
        .await
        .map_err(|source| CatalogError::Transport(source.to_string()))
}

/// Bind `addr` and serve until Ctrl-C.
pub async fn serve(catalog: Catalog, addr: SocketAddr) -> Result<(), CatalogError> {
    let listener = TcpListener::bind(addr)
        .await
        .map_err(|source| CatalogError::Transport(format!("cannot bind {addr}: {source}")))?;

    serve_with_listener(catalog, listener, async {
        if let Err(error) = tokio::signal::ctrl_c().await {
            tracing::warn!(%error, "failed to listen for shutdown signal");
            std::future::pending::<()>().await;
        }
        tracing::info!("shutting down");
    })
    .await
}
