//! Shared test fixtures for SOAP responses, DIDL-Lite documents and device
//! descriptions.
//!
//! These constants are used by multiple test modules to avoid duplication.

/// DIDL-Lite document with two video items; the second has two resources.
pub const DIDL_TWO_ITEMS: &str = r#"<DIDL-Lite xmlns="urn:schemas-upnp-org:metadata-1-0/DIDL-Lite/" xmlns:dc="http://purl.org/dc/elements/1.1/" xmlns:upnp="urn:schemas-upnp-org:metadata-1-0/upnp/" xmlns:dlna="urn:schemas-dlna-org:metadata-1-0/">
<item id="64$0$1" parentID="64$0" restricted="1">
  <dc:title>Star Wars: A New Hope</dc:title>
  <dc:creator>Lucasfilm</dc:creator>
  <upnp:class>object.item.videoItem</upnp:class>
  <dc:date>1977-05-25</dc:date>
  <res size="4521984512" duration="2:01:04.000" bitrate="622592" resolution="1920x1080" protocolInfo="http-get:*:video/x-matroska:*">http://192.168.1.10:8200/MediaItems/101.mkv</res>
</item>
<item id="64$0$2" parentID="64$0" restricted="0">
  <dc:title>Star Wars &amp; Friends</dc:title>
  <upnp:class>object.item.videoItem.movie</upnp:class>
  <res protocolInfo="http-get:*:video/mp4:DLNA.ORG_PN=AVC_MP4_BL_CIF15_AAC_520" size="1024" sampleFrequency="48000" nrAudioChannels="2">http://192.168.1.10:8200/MediaItems/102.mp4?a=1&amp;b=2</res>
  <res protocolInfo="http-get:*:video/mpeg:*">http://192.168.1.10:8200/MediaItems/102.mpg</res>
</item>
</DIDL-Lite>"#;

/// SOAP SearchResponse wrapping an escaped DIDL-Lite document with two items.
pub const SEARCH_RESPONSE_TWO_ITEMS: &str = r#"<?xml version="1.0" encoding="utf-8"?>
<s:Envelope xmlns:s="http://schemas.xmlsoap.org/soap/envelope/" s:encodingStyle="http://schemas.xmlsoap.org/soap/encoding/">
  <s:Body>
    <u:SearchResponse xmlns:u="urn:schemas-upnp-org:service:ContentDirectory:1">
      <Result>&lt;DIDL-Lite xmlns=&quot;urn:schemas-upnp-org:metadata-1-0/DIDL-Lite/&quot; xmlns:dc=&quot;http://purl.org/dc/elements/1.1/&quot; xmlns:upnp=&quot;urn:schemas-upnp-org:metadata-1-0/upnp/&quot;&gt;&lt;item id=&quot;1&quot; parentID=&quot;0&quot; restricted=&quot;1&quot;&gt;&lt;dc:title&gt;starwars episode 1&lt;/dc:title&gt;&lt;upnp:class&gt;object.item.videoItem&lt;/upnp:class&gt;&lt;res protocolInfo=&quot;http-get:*:video/mp4:*&quot;&gt;http://192.168.1.10:8200/MediaItems/1.mp4&lt;/res&gt;&lt;/item&gt;&lt;item id=&quot;2&quot; parentID=&quot;0&quot; restricted=&quot;1&quot;&gt;&lt;dc:title&gt;starwars episode 2&lt;/dc:title&gt;&lt;upnp:class&gt;object.item.videoItem&lt;/upnp:class&gt;&lt;/item&gt;&lt;/DIDL-Lite&gt;</Result>
      <NumberReturned>2</NumberReturned>
      <TotalMatches>2</TotalMatches>
      <UpdateID>17</UpdateID>
    </u:SearchResponse>
  </s:Body>
</s:Envelope>"#;

/// SOAP fault as returned for an unsupported search expression.
pub const SEARCH_FAULT_RESPONSE: &str = r#"<?xml version="1.0" encoding="utf-8"?>
<s:Envelope xmlns:s="http://schemas.xmlsoap.org/soap/envelope/" s:encodingStyle="http://schemas.xmlsoap.org/soap/encoding/">
  <s:Body>
    <s:Fault>
      <faultcode>s:Client</faultcode>
      <faultstring>UPnPError</faultstring>
      <detail>
        <UPnPError xmlns="urn:schemas-upnp-org:control-1-0">
          <errorCode>708</errorCode>
          <errorDescription>Unsupported or invalid search criteria</errorDescription>
        </UPnPError>
      </detail>
    </s:Fault>
  </s:Body>
</s:Envelope>"#;

/// Device description of a media server exposing ContentDirectory with a
/// relative control URL.
pub const MEDIA_SERVER_DESCRIPTION: &str = r#"<?xml version="1.0"?>
<root xmlns="urn:schemas-upnp-org:device-1-0">
  <specVersion><major>1</major><minor>0</minor></specVersion>
  <device>
    <deviceType>urn:schemas-upnp-org:device:MediaServer:1</deviceType>
    <friendlyName>NAS Media</friendlyName>
    <serviceList>
      <service>
        <serviceType>urn:schemas-upnp-org:service:ConnectionManager:1</serviceType>
        <serviceId>urn:upnp-org:serviceId:ConnectionManager</serviceId>
        <controlURL>/ctl/ConnectionMgr</controlURL>
      </service>
      <service>
        <serviceType>urn:schemas-upnp-org:service:ContentDirectory:1</serviceType>
        <serviceId>urn:upnp-org:serviceId:ContentDirectory</serviceId>
        <controlURL>/ctl/ContentDir</controlURL>
      </service>
    </serviceList>
  </device>
</root>"#;

/// Device description of a renderer whose AVTransport control URL has no
/// leading slash and is resolved against `URLBase`.
pub const MEDIA_RENDERER_DESCRIPTION: &str = r#"<?xml version="1.0"?>
<root xmlns="urn:schemas-upnp-org:device-1-0">
  <URLBase>http://192.168.1.30:49152/</URLBase>
  <device>
    <deviceType>urn:schemas-upnp-org:device:MediaRenderer:1</deviceType>
    <friendlyName>Living Room TV</friendlyName>
    <serviceList>
      <service>
        <serviceType>urn:schemas-upnp-org:service:RenderingControl:1</serviceType>
        <controlURL>upnp/control/RenderingControl1</controlURL>
      </service>
      <service>
        <serviceType>urn:schemas-upnp-org:service:AVTransport:1</serviceType>
        <controlURL>upnp/control/AVTransport1</controlURL>
      </service>
      <service>
        <serviceType>urn:schemas-upnp-org:service:AVTransport:1</serviceType>
        <controlURL>upnp/control/AVTransport2</controlURL>
      </service>
    </serviceList>
  </device>
</root>"#;
