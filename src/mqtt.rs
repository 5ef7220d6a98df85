use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;

use mqtt::{Message, Receiver};
use paho_mqtt as mqtt;

use crate::config::MqttConfig;
use crate::events::{Controller, PrinterEvent};

/// Consumes the OctoPrint plugin's event and progress topics and exposes
/// the light itself over a HomeAssistant-discoverable command topic.
pub struct MqttClient {
    client: mqtt::Client,
    receiver: Receiver<Option<Message>>,
    unique_id: String,
    topics: Topics,
    controller: Arc<Mutex<Controller>>,
}

struct Topics {
    /// Prefix of the printer event topics; the suffix is the event name.
    events: String,
    progress: String,
    state: String,
    state_set: String,
    discovery: String,
}

impl MqttClient {
    fn make_lwt_message(topic: &str) -> mqtt::Message {
        let payload = json::object! {
            available: "offline"
        };

        return mqtt::Message::new_retained(topic, json::stringify(payload), 0);
    }

    pub fn new(
        config: &MqttConfig,
        controller: Arc<Mutex<Controller>>,
    ) -> Result<MqttClient, String> {
        let base = config.base_topic.trim_end_matches('/');
        let unique_id = &config.unique_id;
        let topics = Topics {
            events: format!("{base}/event/"),
            progress: format!("{base}/progress/printing"),
            state: format!("drucklicht/{unique_id}/state"),
            state_set: format!("drucklicht/{unique_id}/state/set"),
            discovery: format!("{}/light/{unique_id}/config", config.discovery_prefix),
        };

        let client = match mqtt::Client::new(config.url.as_str()) {
            Ok(client) => client,
            Err(err) => {
                return Err(format!("{:?}", err));
            }
        };

        let conn_opts = mqtt::ConnectOptionsBuilder::new()
            .keep_alive_interval(Duration::from_secs(20))
            .clean_session(true)
            .will_message(MqttClient::make_lwt_message(&topics.state))
            .finalize();

        if let Err(err) = client.connect(conn_opts) {
            return Err(format!("Cannot connect to {}: {:?}", config.url, err));
        }

        log::info!("Connected to broker at {}", config.url);

        let receiver = client.start_consuming();
        let subscriptions = [
            format!("{}#", topics.events),
            topics.progress.clone(),
            topics.state_set.clone(),
        ];
        if let Err(err) = client.subscribe_many(&subscriptions, &[0, 0, 0]) {
            return Err(format!(
                "Failed to subscribe to topics {:?}: {:?}",
                subscriptions, err
            ));
        };

        let mqtt_client = MqttClient {
            client,
            receiver,
            unique_id: unique_id.to_string(),
            topics,
            controller,
        };

        mqtt_client.publish_discovery();
        mqtt_client.publish_state();
        Ok(mqtt_client)
    }

    fn publish_discovery(&self) {
        if !self.client.is_connected() {
            if let Err(err) = self.client.reconnect() {
                log::warn!("Reconnection failed: {err}");
            }
        }

        let payload = json::object! {
            schema: "json",
            device_class: "light",
            device: {
                identifiers: self.unique_id.to_string(),
                model: "drucklicht",
                name: "drucklicht",
            },
            unique_id: self.unique_id.to_string(),
            name: "drucklicht",
            brightness: true,

            availability_topic: self.topics.state.to_string(),
            availability_template: "{{ value_json.available }}",

            state_topic: self.topics.state.to_string(),
            command_topic: self.topics.state_set.to_string(),
        };

        let payload_str = json::stringify(payload);
        let msg = mqtt::Message::new_retained(&self.topics.discovery, payload_str.clone(), 0);
        log::info!("Publishing {}: {}", self.topics.discovery, &payload_str);
        if let Err(err) = self.client.publish(msg) {
            log::warn!("Failed to publish HomeAssistant discovery: {err}");
        }
    }

    fn publish_state(&self) {
        if !self.client.is_connected() {
            if let Err(err) = self.client.reconnect() {
                log::warn!("Reconnection failed: {err}");
                return;
            }
        }

        let (lights_on, brightness) = {
            let controller = lock(&self.controller);
            (controller.lights_on(), controller.brightness())
        };
        let payload = json::object! {
            available: "online",
            state: if lights_on { "ON" } else { "OFF" },
            brightness: brightness,
        };

        let payload_str = json::stringify(payload);
        let msg = mqtt::Message::new_retained(&self.topics.state, payload_str.clone(), 0);
        log::info!("Publishing {}: {}", self.topics.state, &payload_str);
        if let Err(err) = self.client.publish(msg) {
            log::warn!("Publishing failed: {err}");
            return;
        }
    }

    pub fn run(&self) {
        loop {
            match self.receiver.recv() {
                Ok(Some(msg)) => self.handle_message(msg),
                Ok(None) => {
                    if !self.client.is_connected() {
                        log::warn!("Connection lost, reconnecting");
                        if let Err(err) = self.client.reconnect() {
                            log::warn!("Reconnection failed: {err}");
                        }
                    }
                }
                Err(err) => log::warn!("Error receiving messages: {err}"),
            };
        }
    }

    fn handle_message(&self, msg: Message) {
        if let Some(event_name) = msg.topic().strip_prefix(&self.topics.events) {
            match PrinterEvent::parse(event_name) {
                Some(event) => lock(&self.controller).handle_event(event),
                None => log::debug!("Ignoring printer event {}", event_name),
            }
            return;
        }

        if msg.topic() == self.topics.progress {
            self.handle_progress_message(&msg);
            return;
        }

        if msg.topic() == self.topics.state_set {
            self.handle_command_message(&msg);
            self.publish_state();
        }
    }

    fn handle_progress_message(&self, msg: &Message) {
        let json = match json::parse(&msg.payload_str()) {
            Ok(json) => json,
            Err(err) => {
                log::warn!(
                    "Failed to parse message payload from {}: {}",
                    msg.topic(),
                    err
                );
                return;
            }
        };

        match json["progress"].as_f32() {
            Some(value) => {
                let percent = value.round().clamp(0.0, 100.0) as u8;
                lock(&self.controller).handle_progress(percent);
            }
            None => log::warn!("Unexpected progress payload: {}", json::stringify(json)),
        }
    }

    fn handle_command_message(&self, msg: &Message) {
        let json = match json::parse(&msg.payload_str()) {
            Ok(json) => json,
            Err(err) => {
                log::warn!(
                    "Failed to parse message payload from {}: {}",
                    msg.topic(),
                    err
                );
                return;
            }
        };

        log::info!(
            "Received {}: {}",
            msg.topic(),
            json::stringify(json.clone())
        );

        let mut controller = lock(&self.controller);
        if json.has_key("state") {
            if json["state"] == "ON" {
                controller.set_lights(true);
            } else if json["state"] == "OFF" {
                controller.set_lights(false);
            } else {
                log::warn!("Unexpected state value: {}", json["state"]);
            }
        }

        if json.has_key("brightness") {
            match json["brightness"].as_u8() {
                Some(brightness) => controller.set_brightness(brightness),
                None => log::warn!("Unexpected brightness value: {}", json["brightness"]),
            }
        }
    }
}

impl Drop for MqttClient {
    fn drop(&mut self) {
        if let Err(err) = self.client.disconnect(None) {
            // We don't really care about errors here, but let's make rustc happy.
            log::error!("{:?}", err);
        }
    }
}

fn lock(controller: &Arc<Mutex<Controller>>) -> MutexGuard<'_, Controller> {
    match controller.lock() {
        Ok(guard) => guard,
        Err(poisoned) => poisoned.into_inner(),
    }
}
