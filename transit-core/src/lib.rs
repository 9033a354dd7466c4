/*!
# transit_core

Core library of the `transport_catalogue` engine: a catalogue of bus stops
and routes with derived metrics, a time-weighted routing graph answering
fastest-itinerary queries, a scalable SVG map renderer, and a binary
snapshot codec that persists all of the above between the two CLI modes.

The engine is driven entirely through JSON documents on standard streams:

```bash
transport_catalogue make_base < description.json
transport_catalogue process_requests < queries.json > answers.json
```

`make_base` fills the catalogue from `base_requests`, builds the routing
graph, and serializes everything to the file named in
`serialization_settings`. `process_requests` loads that snapshot back and
answers a `stat_requests` batch.

# Example
```ignore
use transit_core::prelude::*;

let input = std::io::stdin();
make_base(input.lock())?;
```
*/

use thiserror::Error;

pub mod catalogue;
pub mod geodesy;
pub mod prelude;
pub mod render;
pub mod requests;
pub mod responses;
pub mod router;
pub mod snapshot;
pub mod svg;

/// Error type shared by every fallible operation of the engine.
#[derive(Error, Debug)]
pub enum Error {
    #[error("i/o error: {0}")]
    Io(#[from] std::io::Error),
    #[error("malformed request document: {0}")]
    Json(#[from] serde_json::Error),
    #[error("failed to decode snapshot: {0}")]
    SnapshotDecode(#[from] ciborium::de::Error<std::io::Error>),
    #[error("failed to encode snapshot: {0}")]
    SnapshotEncode(#[from] ciborium::ser::Error<std::io::Error>),
    #[error("unknown stop: {0}")]
    UnknownStop(String),
}
