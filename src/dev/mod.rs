/// Development utilities module
///
/// The command line and the test suite both run against the fixture-backed
/// mock client; there is no live feed.
pub mod mock_client;
