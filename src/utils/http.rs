use anyhow::Result;
use reqwest::{Client, ClientBuilder};

const USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/108.0.0.0 Safari/537.36";

/// One shared client for the whole run: storefront fetches, the storefront
/// availability check, and the webhook POST.
pub fn create_client() -> Result<Client> {
    let client = ClientBuilder::new().user_agent(USER_AGENT).build()?;
    Ok(client)
}
