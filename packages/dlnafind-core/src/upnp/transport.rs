//! AVTransport control for media renderers.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;

use super::description::{fetch_service_control_url, DescriptionResult};
use super::services::UpnpService;
use super::soap::{SoapRequestBuilder, SoapResult};
use super::traits::{TransportConnector, TransportControl};

/// SOAP client bound to one renderer's AVTransport control URL.
#[derive(Debug, Clone)]
pub struct AvTransportClient {
    client: Client,
    control_url: String,
    timeout: Duration,
}

impl AvTransportClient {
    pub fn new(client: Client, control_url: impl Into<String>, timeout: Duration) -> Self {
        Self {
            client,
            control_url: control_url.into(),
            timeout,
        }
    }

    fn request<'a>(&'a self, action: &'a str, instance: u32) -> SoapRequestBuilder<'a> {
        SoapRequestBuilder::new(&self.client, &self.control_url)
            .service(UpnpService::AVTransport)
            .action(action)
            .instance_id(instance)
            .timeout(self.timeout)
    }

    async fn simple(&self, action: &str, instance: u32) -> SoapResult<()> {
        self.request(action, instance).send().await?;
        Ok(())
    }
}

#[async_trait]
impl TransportControl for AvTransportClient {
    async fn play(&self, instance: u32, speed: &str) -> SoapResult<()> {
        self.request("Play", instance)
            .arg("Speed", speed)
            .send()
            .await?;
        Ok(())
    }

    async fn pause(&self, instance: u32) -> SoapResult<()> {
        self.simple("Pause", instance).await
    }

    async fn stop(&self, instance: u32) -> SoapResult<()> {
        self.simple("Stop", instance).await
    }

    async fn next(&self, instance: u32) -> SoapResult<()> {
        self.simple("Next", instance).await
    }

    async fn previous(&self, instance: u32) -> SoapResult<()> {
        self.simple("Previous", instance).await
    }

    async fn set_av_transport_uri(
        &self,
        instance: u32,
        uri: &str,
        metadata: &str,
    ) -> SoapResult<()> {
        self.request("SetAVTransportURI", instance)
            .arg("CurrentURI", uri)
            .arg("CurrentURIMetaData", metadata)
            .send()
            .await?;
        Ok(())
    }

    async fn set_next_av_transport_uri(
        &self,
        instance: u32,
        uri: &str,
        metadata: &str,
    ) -> SoapResult<()> {
        self.request("SetNextAVTransportURI", instance)
            .arg("NextURI", uri)
            .arg("NextURIMetaData", metadata)
            .send()
            .await?;
        Ok(())
    }
}

/// Connects to renderers by resolving their AVTransport control URL.
#[derive(Debug, Clone)]
pub struct AvTransportConnector {
    client: Client,
    timeout: Duration,
}

impl AvTransportConnector {
    pub fn new(client: Client, timeout: Duration) -> Self {
        Self { client, timeout }
    }
}

#[async_trait]
impl TransportConnector for AvTransportConnector {
    async fn connect(&self, location: &str) -> DescriptionResult<Box<dyn TransportControl>> {
        let control_url =
            fetch_service_control_url(&self.client, location, UpnpService::AVTransport, self.timeout)
                .await?;
        log::debug!("[Transport] {} -> {}", location, control_url);
        Ok(Box::new(AvTransportClient::new(
            self.client.clone(),
            control_url.to_string(),
            self.timeout,
        )))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::upnp::description::DescriptionError;
    use crate::upnp::soap::SoapError;
    use crate::upnp::test_fixtures::MEDIA_SERVER_DESCRIPTION;
    use wiremock::matchers::{body_string_contains, header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    const OK_BODY: &str = r#"<?xml version="1.0"?><s:Envelope xmlns:s="http://schemas.xmlsoap.org/soap/envelope/"><s:Body><u:PlayResponse xmlns:u="urn:schemas-upnp-org:service:AVTransport:1"/></s:Body></s:Envelope>"#;

    fn renderer_description(control: &str) -> String {
        format!(
            r#"<?xml version="1.0"?><root xmlns="urn:schemas-upnp-org:device-1-0"><device><deviceType>urn:schemas-upnp-org:device:MediaRenderer:1</deviceType><friendlyName>TV</friendlyName><serviceList><service><serviceType>urn:schemas-upnp-org:service:AVTransport:1</serviceType><controlURL>{control}</controlURL></service></serviceList></device></root>"#
        )
    }

    #[tokio::test]
    async fn play_sends_instance_and_speed() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/AVTransport/control"))
            .and(header(
                "SOAPACTION",
                "\"urn:schemas-upnp-org:service:AVTransport:1#Play\"",
            ))
            .and(body_string_contains(
                "<InstanceID>0</InstanceID><Speed>1</Speed>",
            ))
            .respond_with(ResponseTemplate::new(200).set_body_string(OK_BODY))
            .expect(1)
            .mount(&server)
            .await;

        let transport = AvTransportClient::new(
            Client::new(),
            format!("{}/AVTransport/control", server.uri()),
            Duration::from_secs(2),
        );
        transport.play(0, "1").await.unwrap();
    }

    #[tokio::test]
    async fn set_next_uri_escapes_the_uri() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(body_string_contains(
                "<NextURI>http://nas/b.mp4?x=1&amp;y=2</NextURI><NextURIMetaData></NextURIMetaData>",
            ))
            .respond_with(ResponseTemplate::new(200).set_body_string(OK_BODY))
            .expect(1)
            .mount(&server)
            .await;

        let transport =
            AvTransportClient::new(Client::new(), server.uri(), Duration::from_secs(2));
        transport
            .set_next_av_transport_uri(0, "http://nas/b.mp4?x=1&y=2", "")
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn rejected_command_surfaces_status() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(500))
            .mount(&server)
            .await;

        let transport =
            AvTransportClient::new(Client::new(), server.uri(), Duration::from_secs(2));
        let err = transport.pause(0).await.unwrap_err();
        assert!(matches!(err, SoapError::HttpStatus { status: 500, .. }));
    }

    #[tokio::test]
    async fn connector_resolves_control_url() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/desc.xml"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_string(renderer_description("/AVTransport/control")),
            )
            .mount(&server)
            .await;
        Mock::given(method("POST"))
            .and(path("/AVTransport/control"))
            .respond_with(ResponseTemplate::new(200).set_body_string(OK_BODY))
            .expect(1)
            .mount(&server)
            .await;

        let connector = AvTransportConnector::new(Client::new(), Duration::from_secs(2));
        let transport = connector
            .connect(&format!("{}/desc.xml", server.uri()))
            .await
            .unwrap();
        transport.stop(0).await.unwrap();
    }

    #[tokio::test]
    async fn connector_rejects_device_without_av_transport() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200).set_body_string(MEDIA_SERVER_DESCRIPTION))
            .mount(&server)
            .await;

        let connector = AvTransportConnector::new(Client::new(), Duration::from_secs(2));
        let result = connector
            .connect(&format!("{}/rootDesc.xml", server.uri()))
            .await;
        assert!(matches!(
            result,
            Err(DescriptionError::ServiceNotFound { .. })
        ));
    }
}
