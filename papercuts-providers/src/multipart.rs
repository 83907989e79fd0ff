// multipart/form-data encoder. Callers never choose a Content-Type for form bodies;
// the boundary is generated here and the header is derived from it.

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FormPart {
    Text {
        name: String,
        value: String,
    },
    File {
        name: String,
        file_name: String,
        mime_type: String,
        bytes: Vec<u8>,
    },
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FormData {
    parts: Vec<FormPart>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EncodedForm {
    pub boundary: String,
    pub bytes: Vec<u8>,
}

impl EncodedForm {
    pub fn content_type(&self) -> String {
        format!("multipart/form-data; boundary={}", self.boundary)
    }
}

impl FormData {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn text(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.parts.push(FormPart::Text {
            name: name.into(),
            value: value.into(),
        });
        self
    }

    pub fn file(
        mut self,
        name: impl Into<String>,
        file_name: impl Into<String>,
        mime_type: impl Into<String>,
        bytes: Vec<u8>,
    ) -> Self {
        self.parts.push(FormPart::File {
            name: name.into(),
            file_name: file_name.into(),
            mime_type: mime_type.into(),
            bytes,
        });
        self
    }

    pub fn push(&mut self, part: FormPart) {
        self.parts.push(part);
    }

    pub fn parts(&self) -> &[FormPart] {
        &self.parts
    }

    pub fn payload_len(&self) -> usize {
        self.parts
            .iter()
            .map(|p| match p {
                FormPart::Text { value, .. } => value.len(),
                FormPart::File { bytes, .. } => bytes.len(),
            })
            .sum()
    }

    pub fn encode(&self) -> EncodedForm {
        let boundary = format!("Boundary-{}", uuid::Uuid::new_v4());
        self.encode_with_boundary(boundary)
    }

    pub fn encode_with_boundary(&self, boundary: String) -> EncodedForm {
        let mut body: Vec<u8> = Vec::with_capacity(self.payload_len() + 256);

        for part in &self.parts {
            match part {
                FormPart::Text { name, value } => append_field(&mut body, &boundary, name, value),
                FormPart::File {
                    name,
                    file_name,
                    mime_type,
                    bytes,
                } => append_file(&mut body, &boundary, name, file_name, mime_type, bytes),
            }
        }

        body.extend_from_slice(format!("--{}--\r\n", boundary).as_bytes());
        EncodedForm {
            boundary,
            bytes: body,
        }
    }
}

fn append_field(body: &mut Vec<u8>, boundary: &str, name: &str, value: &str) {
    body.extend_from_slice(format!("--{}\r\n", boundary).as_bytes());
    body.extend_from_slice(
        format!(
            "Content-Disposition: form-data; name=\"{}\"\r\n\r\n",
            escape_quotes(name)
        )
        .as_bytes(),
    );
    body.extend_from_slice(value.as_bytes());
    body.extend_from_slice(b"\r\n");
}

fn append_file(
    body: &mut Vec<u8>,
    boundary: &str,
    name: &str,
    file_name: &str,
    mime_type: &str,
    bytes: &[u8],
) {
    body.extend_from_slice(format!("--{}\r\n", boundary).as_bytes());
    body.extend_from_slice(
        format!(
            "Content-Disposition: form-data; name=\"{}\"; filename=\"{}\"\r\n",
            escape_quotes(name),
            escape_quotes(file_name)
        )
        .as_bytes(),
    );
    body.extend_from_slice(format!("Content-Type: {}\r\n\r\n", mime_type).as_bytes());
    body.extend_from_slice(bytes);
    body.extend_from_slice(b"\r\n");
}

// Same escaping browsers apply to form-data names.
fn escape_quotes(s: &str) -> String {
    s.replace('"', "%22").replace('\r', "%0D").replace('\n', "%0A")
}
