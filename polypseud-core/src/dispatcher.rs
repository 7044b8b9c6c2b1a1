use std::str::FromStr;
use std::sync::Arc;

use strum::{EnumString, IntoStaticStr};
use tracing::debug;

use crate::config::Config;
use crate::error::PolyPseudError;
use crate::provider::PseudonymProviderClient;
use crate::pseudonym::{PseudonymCodec, PseudonymCrypto};
use crate::resolver::PseudonymResolver;
use crate::store::{PseudonymStore, StoreBackend};

/// The closed set of query names the dispatcher accepts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumString, IntoStaticStr)]
pub enum QueryKind {
    /// `randomize`: re-randomize an encoded pseudonym.
    #[strum(serialize = "randomize")]
    Randomize,
    /// `getEP`: resolve the encrypted pseudonym of a (user, service) pair.
    #[strum(serialize = "getEP")]
    GetEncryptedPseudonym,
    /// `getPP`: resolve the polymorphic pseudonym of a user.
    #[strum(serialize = "getPP")]
    GetPolymorphicPseudonym,
}

impl QueryKind {
    const fn arity(self) -> usize {
        match self {
            Self::Randomize | Self::GetPolymorphicPseudonym => 1,
            Self::GetEncryptedPseudonym => 2,
        }
    }
}

/// A validated query with its positional parameters bound to fields.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Query {
    /// Re-randomize the given encoded pseudonym.
    Randomize {
        /// The encoded pseudonym to transform.
        pseudonym: String,
    },
    /// Resolve the encrypted pseudonym for a (user, service) pair.
    GetEncryptedPseudonym {
        /// User id.
        user: String,
        /// Service (SP) id.
        sp: String,
    },
    /// Resolve the polymorphic pseudonym for a user.
    GetPolymorphicPseudonym {
        /// User id.
        user: String,
    },
}

impl Query {
    /// Validates a query name and its positional parameters.
    ///
    /// # Errors
    ///
    /// Returns [`PolyPseudError::UnknownQuery`] for a name outside the
    /// supported set and [`PolyPseudError::InvalidParameters`] when the
    /// parameter count does not match the query's fixed arity.
    pub fn parse(name: &str, parameters: Vec<String>) -> Result<Self, PolyPseudError> {
        let kind = QueryKind::from_str(name)
            .map_err(|_| PolyPseudError::UnknownQuery(name.to_string()))?;

        let arity_error = |got: usize| PolyPseudError::InvalidParameters {
            query: kind.into(),
            expected: kind.arity(),
            got,
        };

        match kind {
            QueryKind::Randomize => match <[String; 1]>::try_from(parameters) {
                Ok([pseudonym]) => Ok(Self::Randomize { pseudonym }),
                Err(parameters) => Err(arity_error(parameters.len())),
            },
            QueryKind::GetEncryptedPseudonym => match <[String; 2]>::try_from(parameters) {
                Ok([user, sp]) => Ok(Self::GetEncryptedPseudonym { user, sp }),
                Err(parameters) => Err(arity_error(parameters.len())),
            },
            QueryKind::GetPolymorphicPseudonym => match <[String; 1]>::try_from(parameters) {
                Ok([user]) => Ok(Self::GetPolymorphicPseudonym { user }),
                Err(parameters) => Err(arity_error(parameters.len())),
            },
        }
    }
}

/// A rectangular table of strings returned by every query. All queries in
/// this crate produce exactly one row with one column: the encoded output
/// pseudonym.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QueryResult {
    rows: Vec<Vec<String>>,
}

impl QueryResult {
    pub(crate) fn single(value: String) -> Self {
        Self {
            rows: vec![vec![value]],
        }
    }

    /// The result rows, each a list of column values.
    #[must_use]
    pub fn rows(&self) -> &[Vec<String>] {
        &self.rows
    }

    /// Consumes the result, returning the rows.
    #[must_use]
    pub fn into_rows(self) -> Vec<Vec<String>> {
        self.rows
    }
}

/// Handle for a query in flight. Single-consumer: joining consumes the
/// handle, so a result can be collected exactly once.
#[derive(Debug)]
pub struct QueryHandle {
    task: tokio::task::JoinHandle<Result<QueryResult, PolyPseudError>>,
}

impl QueryHandle {
    /// Blocks the calling task until the query completes, returning its
    /// result or re-raising its failure.
    ///
    /// # Errors
    ///
    /// Propagates the query's own error, or [`PolyPseudError::Task`] if the
    /// worker task panicked or was cancelled.
    pub async fn join(self) -> Result<QueryResult, PolyPseudError> {
        self.task
            .await
            .map_err(|err| PolyPseudError::Task(err.to_string()))?
    }
}

/// Asynchronous command surface over [`PseudonymResolver`].
///
/// `submit` validates the query name and arity synchronously, then runs the
/// operation as its own Tokio task; multiple submissions run independently
/// with no cross-query ordering. Must be used within a Tokio runtime, which
/// the host owns.
pub struct QueryDispatcher {
    resolver: Arc<PseudonymResolver>,
}

impl QueryDispatcher {
    /// Creates a dispatcher over an existing resolver.
    #[must_use]
    pub fn new(resolver: Arc<PseudonymResolver>) -> Self {
        Self { resolver }
    }

    /// Wires up a dispatcher from host configuration and the injected
    /// persistence backend and crypto capabilities.
    ///
    /// # Errors
    ///
    /// Returns [`PolyPseudError::InvalidConfig`] if the provider URL
    /// template is missing a substitution slot.
    pub fn from_config(
        config: &Config,
        backend: Arc<dyn StoreBackend>,
        crypto: Arc<dyn PseudonymCrypto>,
        codec: Arc<dyn PseudonymCodec>,
    ) -> Result<Self, PolyPseudError> {
        let store = PseudonymStore::new(backend, Arc::clone(&codec));
        let provider =
            PseudonymProviderClient::new(&config.provider_url_template, Arc::clone(&codec))?;
        let resolver = PseudonymResolver::new(
            store,
            provider,
            crypto,
            codec,
            config.public_key.clone(),
        );
        Ok(Self::new(Arc::new(resolver)))
    }

    /// Submits a named query with positional parameters. Returns a handle
    /// immediately; the operation runs off the calling task.
    ///
    /// # Errors
    ///
    /// Fails synchronously with [`PolyPseudError::UnknownQuery`] or
    /// [`PolyPseudError::InvalidParameters`] before any collaborator is
    /// touched.
    pub fn submit(
        &self,
        name: &str,
        parameters: Vec<String>,
    ) -> Result<QueryHandle, PolyPseudError> {
        let query = Query::parse(name, parameters)?;
        debug!(query = name, "query submitted");

        let resolver = Arc::clone(&self.resolver);
        let task = tokio::spawn(async move {
            match query {
                Query::Randomize { pseudonym } => resolver.randomize(&pseudonym),
                Query::GetEncryptedPseudonym { user, sp } => {
                    resolver.resolve_encrypted(&user, &sp).await
                }
                Query::GetPolymorphicPseudonym { user } => {
                    resolver.resolve_polymorphic(&user).await
                }
            }
        });
        Ok(QueryHandle { task })
    }
}
