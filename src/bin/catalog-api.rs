use album_catalog::{
    alb::AlbRouter,
    api,
    artists::ArtistRepository,
    config::Config,
    musicbrainz::MusicBrainzClient,
    store::DynamoStore,
    utils::{setup_sdk_config, setup_tracing},
};
use aws_sdk_dynamodb::Client;
use http::Method;
use lambda_http::{service_fn, Request};
use tracing::info;

type E = lambda_http::Error;

#[tokio::main]
async fn main() -> Result<(), E> {
    setup_tracing();

    let config = Config::from_env()?;
    let sdk_config = setup_sdk_config(&config).await;
    let repo = ArtistRepository::new(DynamoStore::new(
        Client::new(&sdk_config),
        config.table_name.clone(),
    ));
    let search = MusicBrainzClient::new(&config)?;

    let mut router = AlbRouter::new();
    router.insert(Method::GET, "/artists", |r| api::artists::get_all(&repo, r))?;
    router.insert(Method::POST, "/artists", |r| api::artists::create(&repo, r))?;
    router.insert(Method::GET, "/artists/{artistId}", |r| {
        api::artists::get_one(&repo, r)
    })?;
    router.insert(Method::PUT, "/artists/{artistId}", |r| {
        api::artists::update(&repo, r)
    })?;
    router.insert(Method::DELETE, "/artists/{artistId}", |r| {
        api::artists::delete(&repo, r)
    })?;
    router.insert(Method::GET, "/artists/{artistId}/albums", |r| {
        api::artists::get_albums(&repo, r)
    })?;
    router.insert(Method::POST, "/artists/{artistId}/albums", |r| {
        api::artists::add_album(&repo, r)
    })?;
    router.insert(Method::GET, "/artists/{artistId}/albums/{albumId}", |r| {
        api::artists::get_album(&repo, r)
    })?;
    router.insert(Method::PUT, "/artists/{artistId}/albums/{albumId}", |r| {
        api::artists::update_album(&repo, r)
    })?;
    router.insert(Method::DELETE, "/artists/{artistId}/albums/{albumId}", |r| {
        api::artists::delete_album(&repo, r)
    })?;
    router.insert(Method::POST, "/musicbrainz/artists", |r| {
        api::musicbrainz::artists(&search, r)
    })?;
    router.insert(Method::POST, "/musicbrainz/albums", |r| {
        api::musicbrainz::albums(&search, r)
    })?;

    info!(
        table = config.table_name.as_str(),
        local = config.is_local(),
        "execution started"
    );
    lambda_http::run(service_fn(|request: Request| router.handle(request))).await?;

    Ok(())
}
