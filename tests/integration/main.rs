// Integration tests for the 1C API client
//
// These tests run the client against local servers:
// - HTTP endpoints through wiremock (query parameters, headers, envelopes, errors)
// - The update stream through a tokio-tungstenite server (handshake, delivery order)
// - CSV export of report rows into temporary files

mod client_requests;


#[cfg(feature = "export")]
mod csv_export;
