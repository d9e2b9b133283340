//! Low-level admin REST calls: authentication headers, 401 re-authentication, and decoding.

// crates.io
use reqwest::{
	Method,
	header::{ACCEPT, AUTHORIZATION, CONTENT_TYPE, LOCATION},
};
use serde::de::DeserializeOwned;
// self
use crate::{
	_prelude::*,
	client::KeycloakClient,
	error::{ApiError, DecodeError},
	http,
	oauth,
	obs::{self, RequestKind, RequestOutcome, RequestSpan},
};

/// Raw successful admin response.
#[derive(Clone, Debug)]
pub struct AdminResponse {
	/// HTTP status code.
	pub status: u16,
	/// Response body.
	pub body: Vec<u8>,
	/// `Location` header of create calls.
	pub location: Option<String>,
}

impl KeycloakClient {
	/// Issues a `GET` and decodes the JSON body into `T`.
	pub async fn get<T>(&self, path: &str) -> Result<T>
	where
		T: DeserializeOwned,
	{
		self.get_with_query(path, &[]).await
	}

	/// Issues a `GET` with query parameters and decodes the JSON body into `T`.
	pub async fn get_with_query<T>(&self, path: &str, query: &[(&str, &str)]) -> Result<T>
	where
		T: DeserializeOwned,
	{
		let response = self.send(Method::GET, path, query, None).await?;

		decode(path, &response.body)
	}

	/// Issues a `GET` and discards the body; used for existence checks.
	pub async fn check(&self, path: &str) -> Result<()> {
		self.send(Method::GET, path, &[], None).await.map(|_| ())
	}

	/// Pages through a list endpoint with `first`/`max` until a short page arrives.
	pub async fn get_all_pages<T>(
		&self,
		path: &str,
		query: &[(&str, &str)],
		page_size: usize,
	) -> Result<Vec<T>>
	where
		T: DeserializeOwned,
	{
		let page_size = page_size.max(1);
		let max = page_size.to_string();
		let mut items = Vec::new();
		let mut first = 0_usize;

		loop {
			let first_param = first.to_string();
			let mut paged = query.to_vec();

			paged.push(("first", first_param.as_str()));
			paged.push(("max", max.as_str()));

			let page = self.get_with_query::<Vec<T>>(path, &paged).await?;
			let len = page.len();

			items.extend(page);

			if len < page_size {
				return Ok(items);
			}

			first += page_size;
		}
	}

	/// Issues a `POST` with a JSON body and returns the raw response.
	pub async fn post<B>(&self, path: &str, body: &B) -> Result<AdminResponse>
	where
		B: ?Sized + Serialize,
	{
		let body = encode(path, body)?;

		self.send(Method::POST, path, &[], Some(body)).await
	}

	/// Issues a `POST` and extracts the new identifier from the `Location` header.
	pub async fn post_for_id<B>(&self, path: &str, body: &B) -> Result<String>
	where
		B: ?Sized + Serialize,
	{
		let response = self.post(path, body).await?;
		let location = response
			.location
			.ok_or_else(|| DecodeError::MissingLocation { path: path.to_owned() })?;

		Ok(id_from_location(&location).to_owned())
	}

	/// Issues a `PUT` with a JSON body.
	pub async fn put<B>(&self, path: &str, body: &B) -> Result<()>
	where
		B: ?Sized + Serialize,
	{
		let body = encode(path, body)?;

		self.send(Method::PUT, path, &[], Some(body)).await.map(|_| ())
	}

	/// Issues a `DELETE`.
	pub async fn delete(&self, path: &str) -> Result<()> {
		self.send(Method::DELETE, path, &[], None).await.map(|_| ())
	}

	/// Sends an authenticated admin request.
	///
	/// A 401 answer invalidates the cached token and the request is retried once
	/// with a fresh one. Every other non-success status becomes [`ApiError`].
	pub async fn send(
		&self,
		method: Method,
		path: &str,
		query: &[(&str, &str)],
		body: Option<Vec<u8>>,
	) -> Result<AdminResponse> {
		let kind = request_kind(&method);
		let span = RequestSpan::new(kind, "send");

		obs::record_request_outcome(kind, RequestOutcome::Attempt);

		let result: Result<AdminResponse> = span
			.instrument(async {
				let mut url = self.config.admin_url(path)?;

				if !query.is_empty() {
					url.query_pairs_mut().extend_pairs(query);
				}

				let mut reauthenticated = false;

				loop {
					let token = self.access_token().await?;
					let mut request = self
						.http_client
						.request(method.clone(), url.clone())
						.header(AUTHORIZATION, token.bearer())
						.header(ACCEPT, "application/json");

					for (name, value) in &self.config.additional_headers {
						request = request.header(name.as_str(), value.as_str());
					}
					if let Some(body) = &body {
						request = request.header(CONTENT_TYPE, "application/json").body(body.clone());
					}

					let response =
						request.send().await.map_err(|err| oauth::map_reqwest_error(None, err))?;
					let status = response.status();

					if status.as_u16() == 401 && !reauthenticated && !self.has_static_token() {
						#[cfg(feature = "tracing")]
						tracing::debug!(path, "Admin API answered 401; re-authenticating once.");

						reauthenticated = true;

						self.metrics.record_reauthentication();
						self.invalidate_token();

						continue;
					}

					let location = response
						.headers()
						.get(LOCATION)
						.and_then(|value| value.to_str().ok())
						.map(ToOwned::to_owned);
					let bytes = response
						.bytes()
						.await
						.map_err(|err| oauth::map_reqwest_error(None, err))?
						.to_vec();

					if !status.is_success() {
						return Err(ApiError {
							method: method.to_string(),
							path: path.to_owned(),
							status: status.as_u16(),
							message: http::error_message(&bytes),
						}
						.into());
					}

					return Ok(AdminResponse { status: status.as_u16(), body: bytes, location });
				}
			})
			.await;

		obs::record_result(kind, &result);

		result
	}
}

/// Returns the last path segment of a `Location` header.
pub fn id_from_location(location: &str) -> &str {
	let trimmed = location.trim_end_matches('/');

	trimmed.rsplit('/').next().unwrap_or(trimmed)
}

/// Decodes a JSON body, reporting the JSON path of any mismatch.
pub(crate) fn decode<T>(path: &str, body: &[u8]) -> Result<T>
where
	T: DeserializeOwned,
{
	let mut deserializer = serde_json::Deserializer::from_slice(body);

	serde_path_to_error::deserialize(&mut deserializer)
		.map_err(|source| DecodeError::Json { path: path.to_owned(), source }.into())
}

fn encode<B>(path: &str, body: &B) -> Result<Vec<u8>>
where
	B: ?Sized + Serialize,
{
	serde_json::to_vec(body)
		.map_err(|source| DecodeError::Encode { path: path.to_owned(), source }.into())
}

fn request_kind(method: &Method) -> RequestKind {
	match *method {
		Method::POST => RequestKind::Post,
		Method::PUT => RequestKind::Put,
		Method::DELETE => RequestKind::Delete,
		_ => RequestKind::Get,
	}
}
