/// Instruction sent alongside the canvas image
pub const ANALYSIS_PROMPT: &str = r#"You are a Kubernetes expert. Analyze this hand-drawn architecture diagram and generate production-ready Helm chart YAML.

INTERPRETATION RULES:
- Rectangles/Squares = Kubernetes Deployments or Pods
- Circles = Kubernetes Services
- Lines/Arrows = Service connections or data flow
- Text labels = Component names and configurations

GENERATE:
1. Complete Helm chart templates with proper metadata
2. Use {{ .Values.* }} templating for all configurable values
3. Include resource requests and limits
4. Add health checks (liveness/readiness probes)
5. Proper service selectors matching deployment labels
6. Include a values.yaml section as comments

REQUIREMENTS:
- Production-ready YAML following Helm best practices
- Proper indentation and formatting
- Meaningful default values
- Security best practices (non-root containers, resource limits)
- Include helpful comments explaining each resource

OUTPUT FORMAT:
Return only valid YAML content, starting with the Chart.yaml metadata, followed by template files separated by "---".

IMPORTANT: Analyze the actual drawing carefully. If you see rectangles, generate Deployments. If you see circles, generate Services. Use any text labels you can identify for naming components."#;
