use super::types::RouteParams;

pub trait RequestExt {
	fn param(&self, key: &str) -> Option<&str> {
		self.params()?
			.0
			.iter()
			.find(|(k, _)| k == key)
			.map(|(_, v)| v.as_str())
	}

	fn params(&self) -> Option<&RouteParams>;

	/// Looks up a single query string value, percent-decoded.
	fn query_param(&self, key: &str) -> Option<String>;

	fn provide<T: Send + Sync + Clone + 'static>(&mut self, data: T);

	fn data<T: Send + Sync + 'static>(&self) -> Option<&T>;
}

impl<I> RequestExt for hyper::Request<I> {
	fn params(&self) -> Option<&RouteParams> {
		self.extensions().get::<RouteParams>()
	}

	fn query_param(&self, key: &str) -> Option<String> {
		let query = self.uri().query()?;
		url::form_urlencoded::parse(query.as_bytes())
			.find(|(k, _)| k == key)
			.map(|(_, v)| v.into_owned())
	}

	fn provide<T: Send + Sync + Clone + 'static>(&mut self, data: T) {
		self.extensions_mut().insert(data);
	}

	fn data<T: Send + Sync + 'static>(&self) -> Option<&T> {
		self.extensions().get::<T>()
	}
}
